mod engine_tests;
mod validation_tests;
