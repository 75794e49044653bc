pub mod brevo;
pub mod database;
pub mod fcm;
pub mod health;
