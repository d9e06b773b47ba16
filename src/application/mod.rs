pub mod intake;
pub mod materializer;
