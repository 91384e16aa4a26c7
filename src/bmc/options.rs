//! Engine options: a small enumerated option table in the style of the
//! backend's own `set_opt`/`get_opt_*` introspection, pre-seedable from
//! environment variables and clamped to `[min,max]`.

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BmcOpt {
    Verbosity,
    StopFirst,
    TraceGen,
}

pub struct OptMeta {
    pub long: &'static str,
    pub short: &'static str,
    pub desc: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

const ALL: [BmcOpt; 3] = [BmcOpt::Verbosity, BmcOpt::StopFirst, BmcOpt::TraceGen];

impl BmcOpt {
    pub fn meta(self) -> OptMeta {
        match self {
            BmcOpt::Verbosity => OptMeta {
                long: "verbosity",
                short: "v",
                desc: "logging verbosity passed through to the SAT manager",
                min: 0,
                max: u32::MAX,
                default: 0,
            },
            BmcOpt::StopFirst => OptMeta {
                long: "stop_first",
                short: "s",
                desc: "stop bmc() at the first bound where any bad property is reached",
                min: 0,
                max: 1,
                default: 1,
            },
            BmcOpt::TraceGen => OptMeta {
                long: "trace_gen",
                short: "t",
                desc: "keep the forward solver model-generating so assignment() works",
                min: 0,
                max: 1,
                default: 0,
            },
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            BmcOpt::Verbosity => "BMC_VERBOSITY",
            BmcOpt::StopFirst => "BMC_STOP_FIRST",
            BmcOpt::TraceGen => "BMC_TRACE_GEN",
        }
    }

    pub fn from_long(name: &str) -> Option<Self> {
        ALL.into_iter().find(|o| o.meta().long == name)
    }
}

/// Live option values. Options beyond `VERBOSITY` are booleans stored as
/// `0`/`1` to match the C-flavored `get_opt`/`set_opt(u32)` surface.
pub struct Options {
    values: [u32; 3],
}

impl Options {
    pub fn from_env() -> Self {
        let mut opts = Options {
            values: ALL.map(|o| o.meta().default),
        };
        for opt in ALL {
            if let Ok(raw) = std::env::var(opt.env_var()) {
                if let Ok(v) = raw.parse::<u32>() {
                    let meta = opt.meta();
                    opts.values[opt as usize] = v.clamp(meta.min, meta.max);
                }
            }
        }
        opts
    }

    pub fn get(&self, opt: BmcOpt) -> u32 {
        self.values[opt as usize]
    }

    pub fn is_valid(&self, opt: BmcOpt, val: u32) -> bool {
        let meta = opt.meta();
        (meta.min..=meta.max).contains(&val)
    }

    pub fn set(&mut self, opt: BmcOpt, val: u32) -> Result<(), ConfigError> {
        let meta = opt.meta();
        if !self.is_valid(opt, val) {
            return Err(ConfigError::OutOfRange(meta.long, meta.min as i64, meta.max as i64));
        }
        self.values[opt as usize] = val;
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::from_env()
    }
}
