//! System-wide constants: vendor conventions, guest paths, and script defaults.

/// Application name used in CLI output and generated script banners.
pub const APP_NAME: &str = "stackport";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stackport";

/// Reserved top-level (and per-service) key carrying app-store metadata.
pub const VENDOR_BLOCK_KEY: &str = "x-casaos";

/// Vendor data root. A path of this root plus one segment is an app's data dir.
pub const VENDOR_DATA_ROOT: &str = "/DATA/AppData";

/// Relative token that replaces a vendor per-app data directory.
pub const LOCAL_DATA_DIR: &str = "./data";

/// Base directory under which each application gets its own directory.
pub const APP_BASE_DIR: &str = "/opt";

/// File name of the Compose document written inside the guest.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// File name of the cleartext record of generated credentials.
pub const CREDENTIALS_FILE_NAME: &str = "install_details.conf";

/// OS template searched for when provisioning the generic container path.
pub const DEFAULT_OS_TEMPLATE: &str = "debian-12-standard";

/// Base URL of the community script repository used by external recipes.
pub const COMMUNITY_SCRIPTS_BASE_URL: &str =
    "https://raw.githubusercontent.com/community-scripts/ProxmoxVE/main";

/// Seeded placeholder avatar used when no icon is supplied anywhere.
pub const PLACEHOLDER_ICON_BASE_URL: &str = "https://api.dicebear.com/7.x/identicon/svg?seed=";

/// Substrings that mark an environment variable name as secret-like.
pub const SECRET_KEYWORDS: [&str; 5] = ["PASSWORD", "SECRET", "KEY", "TOKEN", "AUTH"];

/// Value that requests generation of a secret at provisioning time.
pub const AUTO_SECRET_VALUE: &str = "auto";

/// Prefix of placeholder tokens standing in for generated secrets.
pub const SECRET_PLACEHOLDER_PREFIX: &str = "__AUTO_GEN_";

/// Suffix of placeholder tokens standing in for generated secrets.
pub const SECRET_PLACEHOLDER_SUFFIX: &str = "__";

/// Length of each secret generated inside the guest.
pub const GENERATED_SECRET_LENGTH: usize = 32;

/// Number of one-second network probes before continuing optimistically.
pub const NETWORK_PROBE_ATTEMPTS: u32 = 50;

/// Address probed for basic network reachability inside the guest.
pub const NETWORK_PROBE_HOST: &str = "8.8.8.8";

/// Environment variable naming the global defaults file.
pub const CONFIG_ENV_VAR: &str = "STACKPORT_CONFIG";
