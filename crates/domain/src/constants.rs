//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Calendar event shape
pub const EVENT_DURATION_MINUTES: i64 = 60;
pub const EVENT_REMINDER_MINUTES: i64 = 10;
pub const EVENT_REMINDER_METHOD: &str = "popup";
pub const DEFAULT_EVENT_DESCRIPTION: &str = "Added via app";
pub const PRIMARY_CALENDAR_ID: &str = "primary";

// Extraction service
pub const EXTRACTION_FILE_FIELD: &str = "file";
pub const EXTRACTION_FALLBACK_ERROR: &str = "Upload failed";
