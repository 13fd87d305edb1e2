pub mod activities;
pub mod conducted_lessons;
pub mod engine;
pub mod instructors;
pub mod lesson_events;
pub mod pay_rates;
pub mod payroll;
pub mod schedules;
pub mod students;
