pub mod dead_letter;
pub mod fcm;
pub mod health;
pub mod mail;
pub mod message;
pub mod outcome;
pub mod response;
pub mod retry;
pub mod status;
pub mod validation;
