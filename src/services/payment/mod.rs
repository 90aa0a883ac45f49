pub mod interface;
pub mod momo;
pub mod zalopay;
