// Error codes implementation
// This module contains standardized error codes for Scribe Engine

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod config {
    pub const INVALID_CONFIGURATION: &str = "CONFIG_2001";
    pub const MISSING_CREDENTIALS: &str = "CONFIG_2002";
}

pub mod storage {
    pub const RECORD_NOT_FOUND: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
}

pub mod generation {
    pub const PROVIDER_TRANSPORT: &str = "GEN_5001";
    pub const PROVIDER_STATUS: &str = "GEN_5002";
    pub const EMPTY_RESPONSE: &str = "GEN_5003";
    pub const RESPONSE_PARSE: &str = "GEN_5004";
    pub const NOTE_VALIDATION: &str = "GEN_5005";
    pub const PROVIDER_NOT_CONFIGURED: &str = "GEN_5006";
}

pub mod entitlement {
    pub const NO_SUBSCRIPTION: &str = "ENT_6001";
    pub const INACTIVE_SUBSCRIPTION: &str = "ENT_6002";
    pub const SUBSCRIPTION_EXPIRED: &str = "ENT_6003";
    pub const LIMIT_EXCEEDED: &str = "ENT_6004";
    pub const ACCOUNT_LOCKED: &str = "ENT_6005";
}

pub const INTERNAL: &str = "INTERNAL_9001";
