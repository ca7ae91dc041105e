//! Constants used throughout the Orca node.
//!
//! All magic numbers and default values should be defined here or at the top
//! of specific modules if they are tightly coupled to that module's logic.

// =============================================================================
// Network Ports
// =============================================================================

/// Default TCP port for the libp2p host.
pub const DEFAULT_P2P_PORT: u16 = 4001;

/// Default port for the node's HTTP API (chunk endpoint, payment notices).
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default port for a relay's HTTP side-channel.
pub const DEFAULT_RELAY_HTTP_PORT: u16 = 45677;

// =============================================================================
// Network Addresses
// =============================================================================

/// Default listen address for the HTTP API (all interfaces).
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0";

/// Bootstrap relay used for circuit addresses when none is configured.
pub const DEFAULT_BOOTSTRAP_RELAY: &str = "/ip4/130.245.173.212/tcp/4001";

// =============================================================================
// Market Services
// =============================================================================

/// Base URL of the market server (directory and job store).
pub const DEFAULT_MARKET_URL: &str = "http://127.0.0.1:8070";

/// Base URL of the wallet API server.
pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:8071";

// =============================================================================
// Storage Layout
// =============================================================================

/// Default data directory name.
pub const DEFAULT_DATA_DIR_NAME: &str = "orca";

/// Directory holding stored and downloaded files.
pub const FILES_DIR: &str = "files";

/// File name of the name-to-hash index.
pub const NAME_INDEX_FILE: &str = "names.json";

/// Directory holding the node keypair.
pub const KEYSTORE_DIR: &str = "keystore";

/// File name of the protobuf-encoded node keypair.
pub const IDENTITY_KEY_FILE: &str = "identity.key";

/// File name of the optional TOML configuration.
pub const CONFIG_FILE: &str = "config.toml";

// =============================================================================
// File System
// =============================================================================

/// Restrictive file permissions for sensitive files (Unix: owner read/write only).
#[cfg(unix)]
pub const SENSITIVE_FILE_MODE: u32 = 0o600;
