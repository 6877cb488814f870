mod booking;
mod common;
mod reviews;
