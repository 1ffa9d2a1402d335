// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::Error;
use crate::models::Service;
use crate::store::RecordStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let services = store.services();
            if !maybe_print_json(sub.get_flag("json"), &services)? {
                let rows = services
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.clone(),
                            s.name.clone(),
                            fmt_money(&s.price),
                            fmt_money(&s.cost),
                            fmt_money(&(s.price - s.cost)),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Price", "Cost", "GM"], rows)
                );
            }
        }
        Some(("add", sub)) => {
            let service = Service {
                id: sub.get_one::<String>("id").unwrap().trim().to_string(),
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
                price: parse_decimal(sub.get_one::<String>("price").unwrap())?,
                cost: parse_decimal(sub.get_one::<String>("cost").unwrap())?,
            };
            let id = service.id.clone();
            store.add_service(service)?;
            println!("Added service {}", id);
        }
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            let mut service = store
                .service(id)
                .cloned()
                .ok_or_else(|| Error::UnknownService(id.to_string()))?;
            if let Some(name) = sub.get_one::<String>("name") {
                service.name = name.trim().to_string();
            }
            if let Some(price) = sub.get_one::<String>("price") {
                service.price = parse_decimal(price)?;
            }
            if let Some(cost) = sub.get_one::<String>("cost") {
                service.cost = parse_decimal(cost)?;
            }
            store.update_service(service)?;
            println!("Updated service {} (logged sales keep their GM)", id);
        }
        Some(("remove", sub)) => {
            let removed = store.remove_service(sub.get_one::<String>("id").unwrap().trim())?;
            println!("Removed service {} ({})", removed.id, removed.name);
        }
        _ => {}
    }
    Ok(())
}
