pub mod session;
pub mod table1;
pub mod table2;
pub mod table3;
pub mod user;
pub mod user_log;
