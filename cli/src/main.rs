mod simulate;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, fs::OpenOptions};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pvss_config::PvssConfig;
use pvss_group::{GroupParams, KeyPair, SecretKey, mod_exp, parse_biguint};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const KEY_DIR_NAME: &str = ".pvss";
const DEFAULT_KEY_FILE: &str = "member.json";

/// On-disk member key (hex encoded)
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    group_bits: u64,
    secret: String,
    public: String,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let cmd = &args[1];

    match cmd.as_str() {
        "genkey" => {
            let filename = args.get(2).cloned();
            if let Err(e) = genkey(filename) {
                eprintln!("❌ Error generating key: {:#}", e);
                std::process::exit(1);
            }
        }
        "derive" => {
            let Some(secret) = args.get(2) else {
                println!("Usage: derive <secret>");
                return;
            };
            if let Err(e) = derive(secret) {
                eprintln!("❌ Error deriving public key: {:#}", e);
                std::process::exit(1);
            }
        }
        "modexp" => {
            if args.len() < 5 {
                println!("Usage: modexp <base> <exponent> <modulus>");
                return;
            }
            if let Err(e) = modexp(&args[2], &args[3], &args[4]) {
                eprintln!("❌ Error: {:#}", e);
                std::process::exit(1);
            }
        }
        "simulate" => {
            let sim = parse_simulate_args(&args[2..]);
            match simulate::run_simulation(PvssConfig::global(), &sim).await {
                Ok(report) => {
                    println!(
                        "✅ Collected {} keys in {:?}; phase is KEYS_COLLECTED (threshold {})",
                        report.committee_size, report.elapsed, report.threshold
                    );
                }
                Err(e) => {
                    eprintln!("❌ Error running simulation: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        "config" => {
            print!("{}", PvssConfig::generate_sample());
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        _ => {
            println!("❌ Unknown command: {}", cmd);
            println!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("PVSS CLI - Committee Key Collection Tool");
    println!();
    println!("USAGE:");
    println!("  pvss <command> [args]");
    println!();
    println!("KEY COMMANDS:");
    println!("  genkey [filename]          Generate a member key pair in the configured group");
    println!("  derive <secret>            Print g^secret mod p");
    println!("  modexp <b> <e> <m>         Print b^e mod m (decimal or 0x-hex operands)");
    println!();
    println!("PROTOCOL COMMANDS:");
    println!("  simulate [size] [options]  Run a local key collection round");
    println!("  config                     Print a sample pvss.toml");
    println!();
    println!("OTHER COMMANDS:");
    println!("  help                       Show this help message");
    println!();
    println!("SIMULATE OPTIONS:");
    println!("  --size <n>                 Committee size (default: from config)");
    println!("  --timeout <secs>           Give up after this many seconds (default: 60)");
    println!("  --verbose                  Print every collected key");
    println!();
    println!("EXAMPLES:");
    println!("  pvss genkey                          # Write ~/.pvss/member.json");
    println!("  pvss modexp 4 13 497                 # 445");
    println!("  pvss simulate --size 10              # 10-member collection round");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("  PVSS_CONFIG            Path to pvss.toml");
    println!("  PVSS_COMMITTEE_SIZE    Committee size");
    println!("  PVSS_COMMITTEE_MEMBERS Comma-separated member ids (hex)");
    println!("  PVSS_GROUP_MODULUS     Group modulus p");
    println!("  PVSS_GROUP_GENERATOR   Group generator g");
    println!("  PVSS_GROUP_ORDER       Subgroup order q");
    println!("  RUST_LOG               Log level (debug/info/warn/error)");
}

fn parse_simulate_args(args: &[String]) -> simulate::SimulateConfig {
    let mut config = simulate::SimulateConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--size" | "-n" => {
                if let Some(size) = args.get(i + 1) {
                    if let Ok(size) = size.parse() {
                        config.size = Some(size);
                    }
                    i += 1;
                }
            }
            "--timeout" => {
                if let Some(secs) = args.get(i + 1) {
                    if let Ok(secs) = secs.parse() {
                        config.timeout = Duration::from_secs(secs);
                    }
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            other => {
                if let Ok(size) = other.parse() {
                    config.size = Some(size);
                }
            }
        }
        i += 1;
    }

    config
}

fn key_dir() -> anyhow::Result<PathBuf> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(Path::new(&home).join(KEY_DIR_NAME))
}

fn genkey(filename: Option<String>) -> anyhow::Result<()> {
    let params = PvssConfig::global().group_params()?;
    let key_path = key_dir()?.join(filename.unwrap_or_else(|| DEFAULT_KEY_FILE.to_string()));
    write_key_file(&params, &key_path)?;
    Ok(())
}

fn write_key_file(params: &GroupParams, key_path: &Path) -> anyhow::Result<KeyFile> {
    let key_dir = key_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid key path"))?;

    if !key_dir.exists() {
        fs::create_dir_all(key_dir)?;
        println!("📁 Created directory: {}", key_dir.display());

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(key_dir)?.permissions();
            perms.set_mode(0o700);
            fs::set_permissions(key_dir, perms)?;
        }
    }

    if key_path.exists() {
        return Err(anyhow::anyhow!(
            "File {} already exists. Remove it first or use a different filename.",
            key_path.display()
        ));
    }

    println!("🔐 Generating new {}-bit member key...", params.bits());
    let pair = KeyPair::generate(params, &mut rand::thread_rng())?;
    let key_file = KeyFile {
        group_bits: params.bits(),
        secret: format!("{:#x}", pair.secret.as_biguint()),
        public: pair.public.to_string(),
    };
    let json = serde_json::to_string_pretty(&key_file)?;

    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(key_path)
        .with_context(|| format!("Failed to create {}", key_path.display()))?;

    #[cfg(unix)]
    {
        let mut perms = f.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(key_path, perms)?;
    }

    f.write_all(json.as_bytes())?;

    println!("✅ Wrote new key to {}", key_path.display());
    println!("🔑 Public key: {}", key_file.public);

    Ok(key_file)
}

fn derive(secret: &str) -> anyhow::Result<()> {
    let params = PvssConfig::global().group_params()?;
    let secret = SecretKey::from_biguint(&params, parse_biguint(secret)?)?;
    println!("{}", secret.public_key(&params)?);
    Ok(())
}

fn modexp(base: &str, exponent: &str, modulus: &str) -> anyhow::Result<()> {
    let result = mod_exp(
        &parse_biguint(base)?,
        &parse_biguint(exponent)?,
        &parse_biguint(modulus)?,
    )?;
    println!("{}", result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simulate_args() {
        let config = parse_simulate_args(&args(&["--size", "7", "--timeout", "3", "-v"]));
        assert_eq!(config.size, Some(7));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.verbose);

        let config = parse_simulate_args(&args(&["--size", "abc"]));
        assert_eq!(config.size, None);

        let config = parse_simulate_args(&args(&["12"]));
        assert_eq!(config.size, Some(12));
        assert!(!config.verbose);
    }

    #[test]
    fn test_write_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("m.json");
        let params = GroupParams::from_literals("23", "4", "11").unwrap();

        let written = write_key_file(&params, &path).unwrap();
        let read: KeyFile = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.public, written.public);

        let secret = SecretKey::from_biguint(&params, parse_biguint(&read.secret).unwrap()).unwrap();
        assert_eq!(secret.public_key(&params).unwrap().to_string(), read.public);

        // Never overwrite an existing key
        assert!(write_key_file(&params, &path).is_err());
    }
}
