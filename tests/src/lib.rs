//! Host-based integration tests for the RC pulse reader

#[cfg(test)]
mod scenario_tests;

#[cfg(test)]
mod property_tests;

#[cfg(test)]
mod hal_port_tests;

#[cfg(test)]
mod board_tests;
