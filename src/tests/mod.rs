// Test modules for resilient-ops crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on behavior verification.

pub mod classifier;
