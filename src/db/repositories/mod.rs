pub mod session_repository;
pub mod table1_repository;
pub mod table2_repository;
pub mod table3_repository;
pub mod user_log_repository;
pub mod user_repository;
