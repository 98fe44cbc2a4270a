pub mod health;
pub mod statement;
