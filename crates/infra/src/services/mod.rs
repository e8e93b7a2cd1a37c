pub mod apns;
