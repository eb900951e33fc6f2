//! `prebundle hooks` command implementation.

use super::session::SessionOptions;
use miette::Result;
use prebundle_core::{DepPrebundlePlugin, Namespace};
use serde::Serialize;

#[derive(Serialize)]
struct RuleJson {
    hook: &'static str,
    filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<Namespace>,
}

#[derive(Serialize)]
struct HooksJson {
    ok: bool,
    name: &'static str,
    pnp: bool,
    resolve: Vec<RuleJson>,
    load: Vec<RuleJson>,
}

impl HooksJson {
    fn new(plugin: &DepPrebundlePlugin) -> Self {
        let hooks = plugin.hooks();
        Self {
            ok: true,
            name: plugin.name(),
            pnp: plugin.config().pnp,
            resolve: hooks
                .resolve_rules()
                .iter()
                .map(|(filter, hook)| RuleJson {
                    hook: hook.as_str(),
                    filter: filter.as_str().to_string(),
                    namespace: None,
                })
                .collect(),
            load: hooks
                .load_rules()
                .iter()
                .map(|(filter, hook)| RuleJson {
                    hook: hook.as_str(),
                    filter: filter.as_str().to_string(),
                    namespace: filter.namespace(),
                })
                .collect(),
        }
    }
}

/// Print the rule table in registration order.
pub fn run(session: &SessionOptions, json: bool) -> Result<()> {
    let plugin = match session.plugin() {
        Ok(plugin) => plugin,
        Err(e) => return super::fail(e, json),
    };
    let table = HooksJson::new(&plugin);

    if json {
        return super::print_json(&table);
    }

    println!("{}", table.name);
    for (kind, rules) in [("resolve", &table.resolve), ("load", &table.load)] {
        for rule in rules {
            match rule.namespace {
                Some(ns) => println!("  {kind:<8} {:<18} {} (namespace {ns})", rule.hook, rule.filter),
                None => println!("  {kind:<8} {:<18} {}", rule.hook, rule.filter),
            }
        }
    }
    Ok(())
}
