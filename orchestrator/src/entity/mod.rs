pub mod migration_log;
pub mod migration_run;
pub mod service_user;
pub mod validation_report;
