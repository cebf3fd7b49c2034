// ── Configuration & Invariants ───────────────────────────────────────────
// A typed `Config`, a provenance record for audit trails, and a process-wide
// keyed registry enforcing invariants across a config's sections.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EciesError, EciesResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetricConfig {
    pub algorithm: String,
    pub key_bits: u32,
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleConfig {
    pub recipient_id_size: usize,
    pub max_recipients: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EciesSection {
    pub curve: String,
    pub symmetric: SymmetricConfig,
    pub primary_key_derivation_path: String,
    pub mnemonic_strength: u32,
    pub multiple: MultipleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pbkdf2Profile {
    pub name: String,
    pub iterations: u32,
    pub salt_bytes: usize,
    pub hash_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pbkdf2Section {
    pub salt_bytes: usize,
    pub profiles: Vec<Pbkdf2Profile>,
}

/// Full typed configuration for one keyed registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ecies: EciesSection,
    pub member_id_length: usize,
    pub pbkdf2: Pbkdf2Section,
    pub id_provider: String,
}

impl Config {
    /// Defaults matching this crate's actual primitives: secp256k1,
    /// AES-256-GCM, and the `guid-v4` identifier provider.
    pub fn defaults() -> Config {
        Config {
            ecies: EciesSection {
                curve: "secp256k1".to_string(),
                symmetric: SymmetricConfig {
                    algorithm: "AES-256-GCM".to_string(),
                    key_bits: 256,
                    mode: "GCM".to_string(),
                },
                primary_key_derivation_path: "m/44'/0'/0'/0/0".to_string(),
                mnemonic_strength: 128,
                multiple: MultipleConfig {
                    recipient_id_size: 16,
                    max_recipients: 65_535,
                },
            },
            member_id_length: 16,
            pbkdf2: Pbkdf2Section {
                salt_bytes: 16,
                profiles: vec![Pbkdf2Profile {
                    name: "default".to_string(),
                    iterations: 600_000,
                    salt_bytes: 16,
                    hash_bytes: 32,
                }],
            },
            id_provider: "guid-v4".to_string(),
        }
    }
}

/// An audit record of one config being installed: a content checksum, a
/// timestamp, the overrides applied over the named base config, and the
/// call stack that triggered registration.
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    pub checksum: String,
    pub timestamp: DateTime<Utc>,
    pub base_config_key: String,
    pub description: String,
    pub overrides: serde_json::Value,
    pub creation_stack_trace: String,
}

impl Provenance {
    /// Compute a provenance record for `config`, checksummed over its
    /// stable JSON serialization.
    pub fn record(
        base_config_key: &str,
        description: &str,
        config: &Config,
        overrides: serde_json::Value,
    ) -> EciesResult<Provenance> {
        let canonical = serde_json::to_string(config)
            .map_err(|e| EciesError::ParseFailed(format!("config serialization failed: {e}")))?;
        let checksum = hex::encode(Sha256::digest(canonical.as_bytes()));
        let creation_stack_trace = std::backtrace::Backtrace::capture().to_string();
        Ok(Provenance {
            checksum,
            timestamp: Utc::now(),
            base_config_key: base_config_key.to_string(),
            description: description.to_string(),
            overrides,
            creation_stack_trace,
        })
    }
}

type InvariantFn = Arc<dyn Fn(&Config) -> Result<(), String> + Send + Sync>;

/// One user-registered or built-in config invariant.
struct NamedInvariant {
    name: &'static str,
    check: InvariantFn,
    builtin: bool,
}

/// Key of the entry constructed at registry load time. Survives [`Registry::clear`].
pub const DEFAULT_KEY: &str = "default";

/// Process-wide keyed config registry. Entries are validated against every
/// registered invariant on insertion; [`Registry::freeze`] makes the
/// registry read-only (e.g. once application startup has finished).
pub struct Registry {
    entries: RwLock<HashMap<String, Config>>,
    invariants: RwLock<Vec<NamedInvariant>>,
    frozen: RwLock<bool>,
    default_config: Config,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry singleton.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

impl Registry {
    /// A fresh registry with the three built-in invariants registered and
    /// [`DEFAULT_KEY`] populated with [`Config::defaults`], as if constructed
    /// at process load time. Most callers want the process-wide [`registry()`]
    /// singleton instead; this is exposed for tests that need isolation from
    /// it.
    pub fn new() -> Self {
        let default_config = Config::defaults();
        let mut entries = HashMap::new();
        entries.insert(DEFAULT_KEY.to_string(), default_config.clone());
        let registry = Registry {
            entries: RwLock::new(entries),
            invariants: RwLock::new(Vec::new()),
            frozen: RwLock::new(false),
            default_config,
        };
        registry.add_invariant("RecipientIdConsistency", true, recipient_id_consistency);
        registry.add_invariant("Pbkdf2ProfilesValidity", true, pbkdf2_profiles_validity);
        registry.add_invariant(
            "EncryptionAlgorithmConsistency",
            true,
            encryption_algorithm_consistency,
        );
        registry
    }

    fn add_invariant(
        &self,
        name: &'static str,
        builtin: bool,
        check: impl Fn(&Config) -> Result<(), String> + Send + Sync + 'static,
    ) {
        self.invariants.write().push(NamedInvariant {
            name,
            check: Arc::new(check),
            builtin,
        });
    }

    /// Register a custom invariant, run alongside the three built-in ones
    /// on every future [`Registry::register`] call.
    pub fn register_invariant(
        &self,
        name: &'static str,
        check: impl Fn(&Config) -> Result<(), String> + Send + Sync + 'static,
    ) -> EciesResult<()> {
        if *self.frozen.read() {
            return Err(EciesError::InvariantViolation(
                "registry is frozen".to_string(),
            ));
        }
        self.add_invariant(name, false, check);
        Ok(())
    }

    fn validate(&self, config: &Config) -> EciesResult<()> {
        let failures: Vec<String> = self
            .invariants
            .read()
            .iter()
            .filter_map(|inv| match (inv.check)(config) {
                Ok(()) => None,
                Err(msg) => Some(format!("{}: {}", inv.name, msg)),
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(EciesError::InvariantViolation(failures.join("; ")))
        }
    }

    /// Install `config` as the base entry under `key`. Fails if the registry
    /// is frozen or `config` violates any registered invariant.
    pub fn init(&self, key: &str, config: Config) -> EciesResult<()> {
        self.register(key, config)
    }

    /// Install or replace `config` under `key`.
    pub fn register(&self, key: &str, config: Config) -> EciesResult<()> {
        if *self.frozen.read() {
            return Err(EciesError::InvariantViolation(
                "registry is frozen".to_string(),
            ));
        }
        self.validate(&config)?;
        self.entries.write().insert(key.to_string(), config);
        log::info!("[config] registered config under key '{key}'");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Config> {
        self.entries.read().get(key).cloned()
    }

    /// Prevent further registration or invariant changes.
    pub fn freeze(&self) {
        *self.frozen.write() = true;
    }

    pub fn is_frozen(&self) -> bool {
        *self.frozen.read()
    }

    /// Remove all non-builtin invariants and all registered config entries
    /// except [`DEFAULT_KEY`], which is restored to its load-time value.
    pub fn clear(&self) {
        self.invariants.write().retain(|inv| inv.builtin);
        let mut entries = self.entries.write();
        entries.clear();
        entries.insert(DEFAULT_KEY.to_string(), self.default_config.clone());
        drop(entries);
        *self.frozen.write() = false;
    }
}

/// `MEMBER_ID_LENGTH = ECIES.multiple.recipient_id_size = idProvider.byteLength`.
fn recipient_id_consistency(config: &Config) -> Result<(), String> {
    let recipient_id_size = config.ecies.multiple.recipient_id_size;
    let provider_len = match config.id_provider.as_str() {
        "object-id" => 12,
        "guid-v4" | "uuid" => 16,
        _ => config.member_id_length, // opaque providers are caller-sized
    };
    if config.member_id_length != recipient_id_size {
        return Err(format!(
            "MEMBER_ID_LENGTH ({}) != ECIES.multiple.recipient_id_size ({recipient_id_size})",
            config.member_id_length
        ));
    }
    if provider_len != recipient_id_size {
        return Err(format!(
            "id provider '{}' produces {provider_len}-byte ids but recipient_id_size is {recipient_id_size}",
            config.id_provider
        ));
    }
    Ok(())
}

/// `iterations ∈ [1_000, 10_000_000]`, `saltBytes ≥ 16`,
/// `hashBytes ∈ {16, 24, 32, 48, 64}`.
fn pbkdf2_profiles_validity(config: &Config) -> Result<(), String> {
    if config.pbkdf2.profiles.is_empty() {
        return Err("no PBKDF2 profiles configured".to_string());
    }
    if config.pbkdf2.salt_bytes < 16 {
        return Err(format!(
            "PBKDF2.salt_bytes ({}) must be at least 16",
            config.pbkdf2.salt_bytes
        ));
    }
    for profile in &config.pbkdf2.profiles {
        if !(1_000..=10_000_000).contains(&profile.iterations) {
            return Err(format!(
                "profile '{}' has {} iterations, must be in [1_000, 10_000_000]",
                profile.name, profile.iterations
            ));
        }
        if profile.salt_bytes < 16 {
            return Err(format!(
                "profile '{}' has saltBytes {} < 16",
                profile.name, profile.salt_bytes
            ));
        }
        if ![16usize, 24, 32, 48, 64].contains(&profile.hash_bytes) {
            return Err(format!(
                "profile '{}' has hashBytes {} outside {{16,24,32,48,64}}",
                profile.name, profile.hash_bytes
            ));
        }
    }
    Ok(())
}

/// `curve ∈ {secp256k1}`, `symmetric.key_bits ∈ {128, 256}` and matches the
/// symmetric algorithm, and the derivation path matches
/// `m/<purpose>'/<coin>'/…`.
fn encryption_algorithm_consistency(config: &Config) -> Result<(), String> {
    if config.ecies.curve != "secp256k1" {
        return Err(format!("unsupported curve '{}'", config.ecies.curve));
    }
    let expected_algorithm = match config.ecies.symmetric.key_bits {
        128 => "AES-128-GCM",
        256 => "AES-256-GCM",
        other => return Err(format!("key_bits {other} must be 128 or 256")),
    };
    if config.ecies.symmetric.algorithm != expected_algorithm {
        return Err(format!(
            "symmetric.algorithm '{}' does not match key_bits {} (expected '{expected_algorithm}')",
            config.ecies.symmetric.algorithm, config.ecies.symmetric.key_bits
        ));
    }
    let path = &config.ecies.primary_key_derivation_path;
    let segments: Vec<&str> = path.split('/').collect();
    let well_formed = segments.len() >= 3
        && segments[0] == "m"
        && segments[1].ends_with('\'')
        && segments[2].ends_with('\'');
    if !well_formed {
        return Err(format!(
            "primary_key_derivation_path '{path}' does not match m/<purpose>'/<coin>'/…"
        ));
    }
    Ok(())
}
