pub mod allocation;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod fees;
pub mod grades;
pub mod ledger;
pub mod metrics;
pub mod payments;
pub mod students;
pub mod teachers;
pub mod users;
