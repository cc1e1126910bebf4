pub mod altitude_pid;
pub mod attitude_pd;
