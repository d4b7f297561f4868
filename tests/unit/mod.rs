mod common;
mod full_stack_tests;
mod recovery_tests;
