pub mod motor_logs;
