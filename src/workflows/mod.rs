pub mod intake;
pub mod presale;
