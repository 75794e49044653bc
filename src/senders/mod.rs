pub mod mail;
pub mod push;

pub use mail::MailSender;
pub use push::PushSender;
