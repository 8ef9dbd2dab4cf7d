use color_eyre::eyre::{
    Result,
    eyre,
};
use std::path::PathBuf;

pub const DEFAULT_STORE_PATH: &str = "~/.tenzies/scores.json";
pub const DEFAULT_LOG_DIR: &str = "~/.tenzies/logs";

pub const USAGE: &str = "Usage: tenzies [--store <path> | --memory] [--seed <n>] [--log-dir <path>]\n\
     \n\
     Flags:\n\
       --store <path>    File holding best records (default ~/.tenzies/scores.json)\n\
       --memory          Keep best records for this session only\n\
       --seed <n>        Roll dice from a fixed seed\n\
       --log-dir <path>  Directory for log files (default ~/.tenzies/logs)";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreConfig {
    File(PathBuf),
    Memory,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub seed: Option<u64>,
    pub log_dir: PathBuf,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Run(AppConfig),
    Help,
}

/// Parses flags, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut store_path: Option<String> = None;
    let mut memory = false;
    let mut seed: Option<u64> = None;
    let mut log_dir: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--store requires a path argument"))?;
                if store_path.is_some() {
                    return Err(eyre!("--store may only be specified once"));
                }
                store_path = Some(path);
            }
            "--memory" => {
                if memory {
                    return Err(eyre!("--memory may only be specified once"));
                }
                memory = true;
            }
            "--seed" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--seed requires a number argument"))?;
                if seed.is_some() {
                    return Err(eyre!("--seed may only be specified once"));
                }
                let value = raw
                    .parse::<u64>()
                    .map_err(|e| eyre!("--seed expects an unsigned integer, got `{raw}`: {e}"))?;
                seed = Some(value);
            }
            "--log-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--log-dir requires a path argument"))?;
                if log_dir.is_some() {
                    return Err(eyre!("--log-dir may only be specified once"));
                }
                log_dir = Some(dir);
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(eyre!("Unknown argument: {other}\n\n{USAGE}")),
        }
    }

    let store = match (memory, store_path) {
        (true, Some(_)) => {
            return Err(eyre!("--memory and --store cannot be combined"));
        }
        (true, None) => StoreConfig::Memory,
        (false, path) => {
            StoreConfig::File(expand(path.as_deref().unwrap_or(DEFAULT_STORE_PATH))?)
        }
    };
    let log_dir = expand(log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR))?;

    Ok(Command::Run(AppConfig {
        store,
        seed,
        log_dir,
    }))
}

fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .map_err(|e| eyre!("Failed to expand path `{path}`: {e}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_config(list: &[&str]) -> AppConfig {
        match parse_args(args(list)).unwrap() {
            Command::Run(config) => config,
            Command::Help => panic!("expected a run config"),
        }
    }

    #[test]
    fn parse_args__defaults_to_file_store() {
        // when
        let config = run_config(&[]);

        // then
        let StoreConfig::File(path) = config.store else {
            panic!("expected file store");
        };
        assert!(path.ends_with(".tenzies/scores.json"));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn parse_args__reads_all_flags() {
        // when
        let config = run_config(&[
            "--store",
            "/tmp/s.json",
            "--seed",
            "42",
            "--log-dir",
            "/tmp/logs",
        ]);

        // then
        assert_eq!(config.store, StoreConfig::File(PathBuf::from("/tmp/s.json")));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn parse_args__memory_store() {
        assert_eq!(run_config(&["--memory"]).store, StoreConfig::Memory);
    }

    #[test]
    fn parse_args__help_short_circuits() {
        assert_eq!(parse_args(args(&["--seed", "1", "-h"])).unwrap(), Command::Help);
    }

    #[test]
    fn parse_args__rejects_duplicates_and_conflicts() {
        assert!(parse_args(args(&["--seed", "1", "--seed", "2"])).is_err());
        assert!(parse_args(args(&["--memory", "--store", "x.json"])).is_err());
        assert!(parse_args(args(&["--store"])).is_err());
    }

    #[test]
    fn parse_args__rejects_unknown_flag_and_bad_seed() {
        assert!(parse_args(args(&["--turbo"])).is_err());
        assert!(parse_args(args(&["--seed", "-3"])).is_err());
    }
}
