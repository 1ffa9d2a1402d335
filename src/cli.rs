// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::builder::BoolishValueParser;
use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};

fn week_arg() -> Arg {
    Arg::new("week")
        .long("week")
        .short('w')
        .value_parser(value_parser!(u8).range(1..=53))
        .help("Week number within the budget year (default: current week)")
}

fn what_arg() -> Arg {
    Arg::new("what")
        .long("what")
        .required(true)
        .value_parser(["config", "records"])
        .help("config (people, services, goals) or records (active budget year)")
}

fn day_arg(required: bool) -> Arg {
    Arg::new("day")
        .long("day")
        .short('d')
        .required(required)
        .help("Monday..Sunday (three-letter prefixes accepted)")
}

fn person_arg(required: bool) -> Arg {
    Arg::new("person")
        .long("person")
        .short('p')
        .required(required)
        .help("Person code")
}

fn count_arg(name: &'static str, default: Option<&'static str>) -> Arg {
    let a = Arg::new(name)
        .long(name)
        .value_parser(value_parser!(u32).range(1..));
    match default {
        Some(d) => a.default_value(d),
        None => a,
    }
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Print JSON instead of a table")
}

/// `--id N` or `--day D --index I` to address an existing record.
fn target_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("id")
            .long("id")
            .value_parser(value_parser!(u64))
            .help("Record id"),
    )
    .arg(
        Arg::new("index")
            .long("index")
            .value_parser(value_parser!(usize))
            .requires("day")
            .help("Row of the day view (0-based)"),
    )
    .group(
        ArgGroup::new("target")
            .args(["id", "index"])
            .required(true),
    )
}

fn count_section(name: &'static str, about: &'static str, qty: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Log an entry")
                .arg(week_arg())
                .arg(day_arg(true))
                .arg(person_arg(true))
                .arg(count_arg(qty, Some("1"))),
        )
        .subcommand(
            Command::new("list")
                .about("List entries for a week or a day")
                .arg(week_arg())
                .arg(day_arg(false)),
        )
        .subcommand(target_args(
            Command::new("edit")
                .about("Replace an entry")
                .arg(week_arg())
                .arg(day_arg(false))
                .arg(Arg::new("to-day").long("to-day").help("Move the entry to another day"))
                .arg(person_arg(false))
                .arg(count_arg(qty, None)),
        ))
}

pub fn build_cli() -> Command {
    Command::new("salesreport")
        .version(clap::crate_version!())
        .about("Daily aftersales logging, goal tracking and week reports")
        .arg(
            Arg::new("year")
                .long("year")
                .short('y')
                .global(true)
                .help("Budget year, e.g. 2024 or 2024/2025 (default: current)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to config.toml"),
        )
        .arg(json_flag())
        .subcommand(Command::new("init").about("Create the data directory and seed defaults"))
        .subcommand(
            Command::new("avs")
                .about("Extended-warranty (AVS) sales")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Log an AVS sale")
                        .arg(week_arg())
                        .arg(day_arg(true))
                        .arg(person_arg(true))
                        .arg(Arg::new("service").long("service").short('s').required(true))
                        .arg(count_arg("sold", Some("1")))
                        .arg(Arg::new("price").long("price").help("Override the service price")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List AVS sales for a week or a day")
                        .arg(week_arg())
                        .arg(day_arg(false)),
                )
                .subcommand(target_args(
                    Command::new("edit")
                        .about("Replace an AVS sale")
                        .arg(week_arg())
                        .arg(day_arg(false))
                        .arg(Arg::new("to-day").long("to-day").help("Move the sale to another day"))
                        .arg(person_arg(false))
                        .arg(Arg::new("service").long("service").short('s'))
                        .arg(count_arg("sold", None))
                        .arg(Arg::new("price").long("price")),
                )),
        )
        .subcommand(count_section(
            "insurance",
            "Insurance agreement sales",
            "sold",
        ))
        .subcommand(count_section(
            "tv",
            "Precalibrated TV completions",
            "completed",
        ))
        .subcommand(count_section("repair", "Repair tickets", "completed"))
        .subcommand(
            Command::new("qi")
                .about("Quality inspections")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Set the inspection count for a day")
                        .arg(week_arg())
                        .arg(day_arg(true))
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        ),
                ),
        )
        .subcommand(
            Command::new("people")
                .about("People catalogue")
                .subcommand_required(true)
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("code").long("code").required(true))
                        .arg(Arg::new("first").long("first").required(true))
                        .arg(Arg::new("last").long("last").required(true)),
                )
                .subcommand(
                    Command::new("remove").arg(Arg::new("code").long("code").required(true)),
                ),
        )
        .subcommand(
            Command::new("services")
                .about("Service catalogue")
                .subcommand_required(true)
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("price").long("price").required(true))
                        .arg(Arg::new("cost").long("cost").required(true)),
                )
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("price").long("price"))
                        .arg(Arg::new("cost").long("cost")),
                )
                .subcommand(
                    Command::new("remove").arg(Arg::new("id").long("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("goals")
                .about("Cumulative daily goals")
                .subcommand_required(true)
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("section")
                                .long("section")
                                .required(true)
                                .help("avs|insurance|tv|repair"),
                        )
                        .arg(
                            Arg::new("values")
                                .long("values")
                                .required(true)
                                .help("Comma-separated Monday..Saturday targets"),
                        )
                        .arg(
                            Arg::new("year-only")
                                .long("year-only")
                                .action(ArgAction::SetTrue)
                                .help("Store on the budget year instead of globally"),
                        ),
                ),
        )
        .subcommand(
            Command::new("year")
                .about("Budget years")
                .subcommand_required(true)
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("settings")
                        .arg(Arg::new("last-year-gm").long("last-year-gm")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Day and week summaries")
                .subcommand_required(true)
                .subcommand(
                    Command::new("day")
                        .arg(week_arg())
                        .arg(day_arg(true)),
                )
                .subcommand(Command::new("week").arg(week_arg())),
        )
        .subcommand(
            Command::new("export")
                .about("Export reports")
                .subcommand_required(true)
                .subcommand(
                    Command::new("week")
                        .arg(week_arg())
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").short('o').required(true)),
                ),
        )
        .subcommand(
            Command::new("data")
                .about("Back up, restore or reset stored data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("export")
                        .arg(what_arg())
                        .arg(Arg::new("out").long("out").short('o').required(true)),
                )
                .subcommand(
                    Command::new("import")
                        .arg(what_arg())
                        .arg(Arg::new("file").long("file").short('f').required(true)),
                )
                .subcommand(
                    Command::new("reset")
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Also restore catalogues, goals and settings"),
                        )
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm the reset"),
                        ),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Theme and notification settings")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("font-size").long("font-size").help("small|medium|large"))
                        .arg(
                            Arg::new("animation-speed")
                                .long("animation-speed")
                                .help("slow|normal|fast"),
                        )
                        .arg(
                            Arg::new("notifications")
                                .long("notifications")
                                .value_parser(BoolishValueParser::new())
                                .help("on|off"),
                        )
                        .arg(
                            Arg::new("sound")
                                .long("sound")
                                .value_parser(BoolishValueParser::new())
                                .help("on|off"),
                        )
                        .arg(
                            Arg::new("duration")
                                .long("duration")
                                .value_parser(value_parser!(u32))
                                .help("Toast duration in milliseconds"),
                        )
                        .arg(
                            Arg::new("position")
                                .long("position")
                                .help("Toast position, e.g. top-right or bottom-center"),
                        ),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored documents and find days with missing entries")
                .arg(
                    Arg::new("through")
                        .long("through")
                        .help("Check days up to this date, YYYY-MM-DD (default: today)"),
                )
                .arg(
                    Arg::new("weeks")
                        .long("weeks")
                        .default_value("8")
                        .value_parser(value_parser!(u8)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn edit_requires_a_target() {
        let res = build_cli().try_get_matches_from(["salesreport", "avs", "edit", "--sold", "2"]);
        assert!(res.is_err());
        let res = build_cli().try_get_matches_from([
            "salesreport", "repair", "edit", "--index", "0", "--completed", "2",
        ]);
        assert!(res.is_err(), "--index needs --day");
    }
}
