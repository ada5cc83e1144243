pub mod audit;
pub mod crud;
pub mod dashboard;
pub mod table1;
pub mod table2;
pub mod table3;
