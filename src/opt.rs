use std::collections::HashMap;
use std::fmt::Display;
use std::{env, result};

use lazy_static::lazy_static;

pub type Res<T> = Result<T, String>;

pub trait ErrToStr<T, E: Display> {
    fn err_to_str(self) -> Res<T>;
}

impl<T, E: Display> ErrToStr<T, E> for result::Result<T, E> {
    fn err_to_str(self) -> Res<T> {
        self.map_err(|err| err.to_string())
    }
}

#[derive(strum_macros::Display, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum DbgFlg {
    #[strum(serialize = "DBG_FLG_CATALOG")]
    Catalog,
    #[strum(serialize = "DBG_FLG_SCORE")]
    Score,
    #[strum(serialize = "DBG_FLG_SESSION")]
    Session,
    #[strum(serialize = "DBG_FLG_CLI")]
    Cli,
}

lazy_static! {
    pub static ref DBG_FLG_DEFAULTS: HashMap<DbgFlg, bool> = HashMap::from([
        (DbgFlg::Catalog, false),
        (DbgFlg::Score, false),
        (DbgFlg::Session, false),
        (DbgFlg::Cli, true),
    ]);
}

pub fn log_if(s: &str, flg: DbgFlg) {
    if checkflag(flg) {
        println!("{} {}", utc_now(), s);
    }
}

fn utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn checkflag(flag: DbgFlg) -> bool {
    let default = DBG_FLG_DEFAULTS.get(&flag).copied().unwrap_or(false);
    flag_value(env::var(flag.to_string()).ok(), default)
}

fn flag_value(raw: Option<String>, default: bool) -> bool {
    raw.map_or(default, |s| {
        let s = s.trim();
        s == "1" || s.eq_ignore_ascii_case("true")
    })
}
