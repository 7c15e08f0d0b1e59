mod common;
mod forms_tests;
mod staging_tests;
