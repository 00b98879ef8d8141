pub mod check_set;
pub mod compare;
pub mod run_evoef2;
