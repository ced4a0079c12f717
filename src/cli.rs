use std::error::Error;
use std::io::{stdin, stdout};
use std::io::{BufRead, Write};

use clap::{Arg, ArgAction, ArgMatches, Command};
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::card_matcher::Detection;
use crate::catalog::CardCatalog;
use crate::engine::{DraftEngine, ScoreBatch};
use crate::models::Champion;
use crate::opt::*;
use crate::session::DraftSession;

const TOP_PICKS: usize = 10;

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Cli);
}

pub struct Repl {
    engine: DraftEngine,
    session: DraftSession,
}

impl Repl {
    pub fn new(engine: DraftEngine, session: DraftSession) -> Self {
        Repl { engine, session }
    }

    pub fn session(&self) -> &DraftSession {
        &self.session
    }

    pub async fn main(&mut self) -> Result<(), Box<dyn Error>> {
        self.run(stdin().lock(), stdout()).await
    }

    /// Reads commands until `quit` or the end of `input`.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), Box<dyn Error>> {
        log(format!("Draft run {}", self.session.run_id()));
        while let Some(line) = readline(&mut input, &mut output)? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.respond(line).await {
                Ok((text, quit)) => {
                    if !text.is_empty() {
                        writeln!(output, "{}", text)?;
                    }
                    output.flush()?;
                    if quit {
                        return Ok(());
                    }
                }
                Err(err) => {
                    writeln!(output, "{err}")?;
                    output.flush()?;
                }
            }
        }

        log("End of input".to_string());
        Ok(())
    }

    /// Runs one command line. Returns the text to show and whether to quit.
    pub async fn respond(&mut self, line: &str) -> Result<(String, bool), Box<dyn Error>> {
        let args = shlex::split(line).ok_or("error: Invalid quoting")?;
        let matches = cli().try_get_matches_from(args)?;

        let output = match matches.subcommand() {
            Some(("champion", matches)) => {
                self.session.set_champion(&joined(matches, "NAME"))?;
                format!(
                    "Champion: {} ({})",
                    self.session.champion(),
                    self.session.champion_path()
                )
            }
            Some(("champions", _matches)) => Champion::iter()
                .map(|champion| format!("{} [{}]", champion, champion.paths().join(", ")))
                .join("\n"),
            Some(("path", matches)) => {
                let path = joined(matches, "PATH");
                let champion = self.session.champion();
                self.session.set_champion_path(&path);
                if champion.has_path(&path) {
                    format!("Path: {}", path)
                } else {
                    format!("Path: {} (not a declared path for {})", path, champion)
                }
            }
            Some(("ring", matches)) => {
                let ring = number(matches, "RING")?;
                self.session.set_current_ring(ring);
                format!("Ring: {}", self.session.current_ring())
            }
            Some(("covenant", matches)) => {
                let level = number(matches, "LEVEL")?;
                self.session.set_covenant_level(level);
                format!("Covenant: {}", self.session.covenant_level())
            }
            Some(("add", matches)) => {
                let card = self.engine.resolve_card(&joined(matches, "CARD"))?.clone();
                let deck_card = self.session.add_card(card);
                format!("#{} {}", deck_card.draft_order, deck_card.card.to_text())
            }
            Some(("remove", matches)) => {
                let card = self.engine.resolve_card(&joined(matches, "CARD"))?;
                if self.session.remove_card(&card.id) {
                    format!("Removed {}", card.name)
                } else {
                    format!("{} is not in the deck", card.name)
                }
            }
            Some(("clear", _matches)) => {
                self.session.clear_deck();
                "Deck cleared".to_string()
            }
            Some(("deck", _matches)) => {
                let analysis = self.session.analyze(&self.engine.calculator().analyzer());
                format!("{}\n{}", self.session.to_text(), analysis.to_text())
            }
            Some(("score", matches)) => self.score(matches).await?,
            Some(("detect", matches)) => self.detect(matches).await?,
            Some(("synergies", matches)) => {
                let card = self.engine.resolve_card(&joined(matches, "CARD"))?;
                let synergies = self.engine.synergies_for(&card.id)?;
                if synergies.is_empty() {
                    format!("{} is not part of any synergy", card.name)
                } else {
                    synergies
                        .iter()
                        .map(|synergy| {
                            format!(
                                "{} (+{:.0}%) needs {}",
                                synergy.name,
                                synergy.bonus * 100.0,
                                synergy.requires.iter().join(", ")
                            )
                        })
                        .join("\n")
                }
            }
            Some(("modifiers", _matches)) => self
                .engine
                .context_modifiers()
                .iter()
                .map(|modifier| {
                    let label = if modifier.description.is_empty() {
                        &modifier.name
                    } else {
                        &modifier.description
                    };
                    format!("{}: {} ({:+})", modifier.name, label, modifier.delta)
                })
                .join("\n"),
            Some(("search", matches)) => {
                let query = joined(matches, "QUERY");
                let found = self.engine.catalog().search(&query);
                if found.is_empty() {
                    format!("No card matches '{}'", query)
                } else {
                    found.iter().map(|card| card.to_text()).join("\n")
                }
            }
            Some(("quit", _matches)) => return Ok(("Exiting ...".to_string(), true)),
            Some((name, _matches)) => return Err(format!("error: Invalid command {}", name).into()),
            None => unreachable!("subcommand required"),
        };

        Ok((output, false))
    }

    async fn score(&self, matches: &ArgMatches) -> Result<String, Box<dyn Error>> {
        let requested: Vec<String> = matches
            .get_many::<String>("CARDS")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let card_ids: Vec<String> = if requested.is_empty() {
            self.engine
                .catalog()
                .get_all()
                .iter()
                .map(|card| card.id.clone())
                .collect()
        } else {
            requested
                .iter()
                .map(|raw| self.engine.resolve_card(raw).map(|card| card.id.clone()))
                .collect::<Result<_, _>>()?
        };

        let context = self.session.scoring_context();
        let batch = self.engine.score_many(&card_ids, &context).await;
        self.publish(&batch)?;

        let rows = if requested.is_empty() {
            batch
                .scores()
                .iter()
                .sorted_by(|(a_id, a), (b_id, b)| b.score.cmp(&a.score).then_with(|| a_id.cmp(b_id)))
                .take(TOP_PICKS)
                .map(|(id, score)| (id.as_str(), score))
                .collect::<Vec<_>>()
        } else {
            batch.in_request_order(&card_ids)
        };

        Ok(rows
            .into_iter()
            .map(|(id, score)| {
                let name = self
                    .engine
                    .catalog()
                    .get_by_id(id)
                    .map_or(id, |card| card.name.as_str());
                format!("{} {}\n    {}", score.to_text(), name, score.reasons.join("; "))
            })
            .join("\n"))
    }

    async fn detect(&self, matches: &ArgMatches) -> Result<String, Box<dyn Error>> {
        let detections = matches
            .get_many::<String>("READ")
            .map(|values| values.map(|raw| parse_detection(raw)).collect::<Res<Vec<_>>>())
            .unwrap_or_else(|| Ok(Vec::new()))?;

        let context = self.session.scoring_context();
        let (card_matches, batch) = self.engine.score_detections(&detections, &context).await;
        self.publish(&batch)?;

        if card_matches.is_empty() {
            return Ok("No card recognized".to_string());
        }

        Ok(card_matches
            .iter()
            .filter_map(|card_match| {
                batch.get(&card_match.card_id).map(|score| {
                    format!(
                        "{} {} <- '{}' ({:.0}%)",
                        score.to_text(),
                        card_match.card_name,
                        card_match.detected_text,
                        card_match.overall_confidence * 100.0
                    )
                })
            })
            .join("\n"))
    }

    fn publish(&self, batch: &ScoreBatch) -> Res<()> {
        if self.session.accepts(batch) {
            Ok(())
        } else {
            Err("error: The deck changed while scoring, try again".to_string())
        }
    }
}

/// `TEXT:CONFIDENCE`, confidence defaulting to 100 when omitted.
fn parse_detection(raw: &str) -> Res<Detection> {
    match raw.rsplit_once(':') {
        Some((text, confidence)) => {
            let confidence = confidence.trim().parse::<i32>().err_to_str()?;
            Ok(Detection::new(text, confidence))
        }
        None => Ok(Detection::new(raw, 100)),
    }
}

fn joined(matches: &ArgMatches, id: &str) -> String {
    matches
        .get_many::<String>(id)
        .map(|mut values| values.join(" "))
        .unwrap_or_default()
}

fn number(matches: &ArgMatches, id: &str) -> Res<i32> {
    matches
        .get_one::<i32>(id)
        .copied()
        .ok_or_else(|| format!("error: Missing {}", id))
}

fn words(id: &'static str) -> Arg {
    Arg::new(id).required(true).num_args(1..).action(ArgAction::Append)
}

fn cli() -> Command {
    // strip out usage
    const PARSER_TEMPLATE: &str = "\
        {all-args}
    ";
    // strip out name/version
    const COMMAND_TEMPLATE: &str = "\
        {about-with-newline}\n\
        {usage-heading}\n    {usage}\n\
        \n\
        {all-args}{after-help}\
    ";

    let subcommands = [
        Command::new("champion")
            .about("Pick the champion by name or id")
            .arg(words("NAME")),
        Command::new("champions").about("List champions and their paths"),
        Command::new("path")
            .about("Set the champion path")
            .arg(words("PATH")),
        Command::new("ring").about("Set the current ring").arg(
            Arg::new("RING")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i32)),
        ),
        Command::new("covenant")
            .about("Set the covenant level (0-25)")
            .arg(
                Arg::new("LEVEL")
                    .required(true)
                    .allow_negative_numbers(true)
                    .value_parser(clap::value_parser!(i32)),
            ),
        Command::new("add")
            .about("Add a card to the deck")
            .arg(words("CARD")),
        Command::new("remove")
            .about("Remove the earliest copy of a card")
            .arg(words("CARD")),
        Command::new("clear").about("Empty the deck and go back to ring 1"),
        Command::new("deck").about("Show the deck and what it is missing"),
        Command::new("score")
            .about("Score cards by id or quoted name; top picks when none are given")
            .arg(Arg::new("CARDS").num_args(0..).action(ArgAction::Append)),
        Command::new("detect")
            .about("Score screen reads given as 'TEXT:CONFIDENCE'")
            .arg(words("READ")),
        Command::new("synergies")
            .about("List the synergies a card takes part in")
            .arg(words("CARD")),
        Command::new("modifiers").about("List the context modifiers"),
        Command::new("search")
            .about("Search card names, keywords and descriptions")
            .arg(words("QUERY")),
        Command::new("quit")
            .alias("exit")
            .alias("q")
            .alias(":q")
            .about("Quit the REPL"),
    ];

    subcommands.into_iter().fold(
        Command::new("repl")
            .multicall(true)
            .arg_required_else_help(true)
            .subcommand_required(true)
            .subcommand_value_name("COMMAND")
            .subcommand_help_heading("COMMANDS")
            .help_template(PARSER_TEMPLATE),
        |cmd, subcommand| cmd.subcommand(subcommand.help_template(COMMAND_TEMPLATE)),
    )
}

/// `None` once the input is exhausted.
fn readline<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>, Box<dyn Error>> {
    write!(output, "> ")?;
    output.flush()?;
    let mut buffer = String::new();
    if input.read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
