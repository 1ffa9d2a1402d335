// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Person;
use crate::store::RecordStore;
use crate::utils::{maybe_print_json, person_code, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let people = store.people();
            if !maybe_print_json(sub.get_flag("json"), &people)? {
                let rows = people
                    .iter()
                    .map(|p| vec![p.code.clone(), p.full_name()])
                    .collect();
                println!("{}", pretty_table(&["Code", "Name"], rows));
            }
        }
        Some(("add", sub)) => {
            let person = Person {
                code: person_code(sub.get_one::<String>("code").unwrap()),
                first_name: sub.get_one::<String>("first").unwrap().trim().to_string(),
                last_name: sub.get_one::<String>("last").unwrap().trim().to_string(),
            };
            let code = person.code.clone();
            store.add_person(person)?;
            println!("Added person {}", code);
        }
        Some(("remove", sub)) => {
            let code = person_code(sub.get_one::<String>("code").unwrap());
            let removed = store.remove_person(&code)?;
            println!("Removed {} ({})", removed.code, removed.full_name());
        }
        _ => {}
    }
    Ok(())
}
