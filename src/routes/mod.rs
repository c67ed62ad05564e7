pub mod attendance;
pub mod auth;
pub mod classes;
pub mod fees;
pub mod grades;
pub mod health;
pub mod ledger;
pub mod metrics;
pub mod payments;
pub mod signup;
pub mod students;
pub mod teachers;
pub mod users;
