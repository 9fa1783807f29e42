use serde_json::json;

use backoffice::browser::{DetailPanel, Dispatcher, ListController, PrimaryState};
use backoffice::model::{FilterSet, Record, parse_filter_arg};

use super::output::{print_record, print_table};
use super::*;
use crate::cli_commands::resources::{ListArgs, ShowArgs};

fn list_of(list: &mut ListController<Record>) -> Option<&mut ListController<Record>> {
    Some(list)
}

fn panel_of(panel: &mut DetailPanel<Record>) -> Option<&mut DetailPanel<Record>> {
    Some(panel)
}

pub(super) async fn handle_list_command(
    cfg: &ConsoleConfig,
    gateway: Arc<HttpGateway>,
    args: ListArgs,
) -> Result<()> {
    let kind = args.resource;
    let mut filters = FilterSet::with_keys(kind.filters().iter().map(|f| f.key));
    for raw in &args.filters {
        let (key, value) = parse_filter_arg(raw)?;
        if kind.filter(&key).is_none() {
            tracing::debug!(%kind, %key, "filter not in the catalog; sent as-is");
        }
        filters.set(key, value);
    }

    let page_size = args.page_size.unwrap_or(cfg.list.page_size);
    let mut list = ListController::<Record>::with_filters(kind, filters, page_size);
    let fetch = list.set_page(args.page, page_size);

    let mut dispatcher: Dispatcher<ListController<Record>> = Dispatcher::current();
    dispatcher.list(&gateway, fetch, list_of);
    dispatcher.settle(&mut list).await;

    if let Some(err) = list.phase().error() {
        anyhow::bail!("list {}: {}", kind, err);
    }

    let page = list.page();
    if args.json {
        let out = json!({
            "records": list.records(),
            "total": list.total(),
            "page": page.page(),
            "pageSize": page.page_size(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize list json")?
        );
        return Ok(());
    }

    print_table(kind.columns(), list.records());
    println!(
        "page {}/{}  total {}",
        page.page(),
        list.page_count(),
        list.total()
    );
    Ok(())
}

pub(super) async fn handle_show_command(gateway: Arc<HttpGateway>, args: ShowArgs) -> Result<()> {
    let kind = args.resource;
    let id = args.id;

    let spec = match &args.tab {
        Some(key) => {
            let spec = kind.tab(key).with_context(|| {
                let keys: Vec<&str> = kind.tabs().iter().map(|t| t.key).collect();
                if keys.is_empty() {
                    format!("{} has no tabs", kind)
                } else {
                    format!("{} has no tab {:?} (tabs: {})", kind, key, keys.join(", "))
                }
            })?;
            Some(spec)
        }
        None => None,
    };

    let mut panel = DetailPanel::<Record>::new(kind);
    let mut dispatcher: Dispatcher<DetailPanel<Record>> = Dispatcher::current();
    let fetch = panel.open(id);
    dispatcher.primary(&gateway, fetch, panel_of);
    if let Some(spec) = spec {
        panel.set_tab_page(spec.key, args.tab_page, spec.page_size);
        if let Some(fetch) = panel.activate_tab(spec.key) {
            dispatcher.tab(&gateway, fetch, panel_of);
        }
    }
    dispatcher.settle(&mut panel).await;

    let record = match panel.primary_state() {
        Some(PrimaryState::Loaded(record)) => record,
        Some(PrimaryState::NotFound) => anyhow::bail!("{} #{} not found", kind, id),
        Some(PrimaryState::Failed(msg)) => anyhow::bail!("show {} {}: {}", kind, id, msg),
        Some(PrimaryState::Loading) | None => anyhow::bail!("show {} {}: no response", kind, id),
    };
    let tab = spec.and_then(|s| panel.tab(s.key).map(|t| (s, t)));
    if let Some((s, t)) = tab
        && let Some(err) = t.phase().error()
    {
        anyhow::bail!("{} #{} {}: {}", kind, id, s.key, err);
    }

    if args.json {
        let mut out = json!({ "record": record });
        if let Some((s, t)) = tab {
            out["tab"] = json!({
                "key": s.key,
                "records": t.records(),
                "total": t.total(),
                "page": t.page().page(),
                "pageSize": t.page().page_size(),
            });
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize record json")?
        );
        return Ok(());
    }

    print_record(record);
    if let Some((s, t)) = tab {
        let page = t.page();
        println!();
        println!(
            "{}  page {}/{}  total {}",
            s.label,
            page.page(),
            page.page_count(t.total()),
            t.total()
        );
        print_table(s.kind.columns(), t.records());
    }
    Ok(())
}
