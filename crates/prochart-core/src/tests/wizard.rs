use super::purifiers;
use crate::layout::{ChartHeight, LayoutChange};
use crate::library::ExportedImages;
use crate::*;
use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn wizard() -> (Wizard, Arc<MemoryChartStore>) {
    let store = Arc::new(MemoryChartStore::new());
    let wizard = Wizard::new(purifiers(), store.clone());
    (wizard, store)
}

fn images() -> ExportedImages {
    ExportedImages {
        full_image: "data:image/png;base64,AAAA".to_string(),
        thumbnail_image: "data:image/jpeg;base64,BBBB".to_string(),
    }
}

/// Drives a wizard to the preview step with products `a`, `b`, `c` and two parameters.
fn to_preview(w: &mut Wizard) {
    for id in ["a", "b", "c"] {
        w.select_product(id).unwrap();
    }
    w.next().unwrap();
    w.select_parameter("价格");
    w.select_parameter("噪音级别");
    w.next().unwrap();
    w.choose_archetype(ChartArchetype::Bar);
    w.set_title("对比");
    w.next().unwrap();
    w.next().unwrap();
    assert_eq!(w.step(), WizardStep::PreviewExport);
}

#[test]
fn sixth_product_is_rejected_with_a_notice() {
    let (mut w, _) = wizard();
    for id in ["a", "b", "c", "d", "e"] {
        w.select_product(id).unwrap();
    }
    let before = w.selection().clone();
    let err = w.select_product("f").unwrap_err();
    assert_eq!(err, GateViolation::TooManyProducts { max: 5 });
    assert_eq!(w.selection(), &before);
    let notice = w.notices().last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.step, WizardStep::SelectProducts);
    assert!(notice.message.contains('5'));
}

#[test]
fn unknown_products_are_rejected() {
    let (mut w, _) = wizard();
    assert_eq!(
        w.select_product("zzz"),
        Err(GateViolation::UnknownProduct {
            id: "zzz".to_string()
        })
    );
    assert_eq!(w.selection().product_count(), 0);
}

#[test]
fn toggle_adds_then_removes() {
    let (mut w, _) = wizard();
    assert_eq!(w.toggle_product("a"), Ok(true));
    assert_eq!(w.toggle_product("a"), Ok(false));
    assert!(w.toggle_parameter("价格"));
    assert!(!w.toggle_parameter("价格"));
    assert_eq!(w.selection().parameter_count(), 0);
}

#[test]
fn gates_block_advancing_without_enough_products_or_parameters() {
    let (mut w, _) = wizard();
    assert_eq!(
        w.next(),
        Err(GateViolation::TooFewProducts { count: 0, min: 2 })
    );
    w.select_product("a").unwrap();
    assert!(w.next().is_err());
    assert_eq!(w.step(), WizardStep::SelectProducts);

    w.select_product("b").unwrap();
    assert_eq!(w.next(), Ok(WizardStep::SelectParameters));
    assert_eq!(w.next(), Err(GateViolation::NoParameters));
    assert_eq!(w.step(), WizardStep::SelectParameters);

    w.select_parameter("CADR");
    assert_eq!(w.next(), Ok(WizardStep::ChooseArchetypeAndStyle));
    assert_eq!(w.next(), Err(GateViolation::NoArchetype));
    w.choose_archetype(ChartArchetype::Radar);
    w.set_title("   ");
    assert_eq!(w.next(), Err(GateViolation::BlankTitle));
    w.set_title("Radar");
    assert_eq!(w.next(), Ok(WizardStep::TuneLayout));
}

#[test]
fn style_step_is_unreachable_with_an_invalid_selection() {
    let (mut w, _) = wizard();
    let ids = ["a", "b", "c", "d", "e", "f"];
    for take in 0..=ids.len() {
        w.restart();
        for id in &ids[..take] {
            let _ = w.select_product(id);
        }
        let _ = w.next();
        let _ = w.next();
        assert_ne!(w.step(), WizardStep::ChooseArchetypeAndStyle, "take={take}");
        w.select_parameter("价格");
        let _ = w.next();
        let count = w.selection().product_count();
        assert!(count <= 5);
        let reached = w.step() == WizardStep::ChooseArchetypeAndStyle;
        assert_eq!(reached, (2..=5).contains(&count), "take={take}");
    }
}

#[test]
fn back_keeps_state_and_stops_at_the_first_step() {
    let (mut w, _) = wizard();
    to_preview(&mut w);
    assert_eq!(w.back(), Ok(WizardStep::TuneLayout));
    assert_eq!(w.back(), Ok(WizardStep::ChooseArchetypeAndStyle));
    assert_eq!(w.title(), "对比");
    assert_eq!(w.back(), Ok(WizardStep::SelectParameters));
    assert_eq!(w.back(), Ok(WizardStep::SelectProducts));
    assert_eq!(w.back(), Err(GateViolation::AtFirstStep));
    assert_eq!(w.selection().product_count(), 3);
}

#[test]
fn available_parameters_follow_the_selected_products() {
    let (mut w, _) = wizard();
    assert!(w.available_parameters().is_empty());
    w.select_product("c").unwrap();
    let params = w.available_parameters();
    assert!(!params.contains(&"价格".to_string()));
    assert!(params.contains(&"WiFi".to_string()));
    w.select_product("a").unwrap();
    assert_eq!(w.available_parameters()[0], "价格");
}

#[test]
fn recommendations_track_the_selection() {
    let (mut w, _) = wizard();
    for id in ["a", "b", "c"] {
        w.select_product(id).unwrap();
    }
    for p in ["价格", "噪音级别", "CADR"] {
        w.select_parameter(p);
    }
    let kinds = |w: &Wizard| {
        w.recommendations()
            .into_iter()
            .map(|r| r.archetype)
            .collect::<Vec<_>>()
    };
    assert_eq!(kinds(&w), vec![ChartArchetype::Bar]);
    w.select_parameter("静音模式");
    assert_eq!(kinds(&w), vec![ChartArchetype::Bar, ChartArchetype::Radar]);
}

#[test]
fn entering_preview_compiles_and_edits_recompile() {
    let (mut w, _) = wizard();
    to_preview(&mut w);
    let spec = w.spec().unwrap().clone();
    assert_eq!(spec.series_count(), 2);
    w.set_theme(Theme::Dark);
    assert_eq!(w.spec().unwrap().theme, Theme::Dark);
    assert_eq!(w.spec().unwrap().body, {
        let mut expected = spec.body.clone();
        if let ChartBody::Cartesian(c) = &mut expected {
            for (i, s) in c.series.iter_mut().enumerate() {
                s.color = Theme::Dark.color(i).to_string();
            }
        }
        expected
    });
}

#[test]
fn layout_edits_publish_events_without_recompiling() {
    let (mut w, _) = wizard();
    to_preview(&mut w);
    let events: Rc<RefCell<Vec<LayoutChange>>> = Rc::default();
    let sink = events.clone();
    w.layout_mut().subscribe(move |e| sink.borrow_mut().push(e.change));

    let spec_before = w.spec().cloned();
    w.layout_mut().set_width(640.0);
    w.layout_mut().set_border(layout::Border {
        width: 2.0,
        style: layout::BorderStyle::Dashed,
        ..Default::default()
    });
    assert_eq!(w.spec().cloned(), spec_before);
    assert_eq!(
        *events.borrow(),
        vec![LayoutChange::Width, LayoutChange::Border]
    );
}

#[test]
fn choosing_table_switches_layout_to_auto_height() {
    let (mut w, _) = wizard();
    w.choose_archetype(ChartArchetype::Table);
    assert_eq!(w.layout().options().height, ChartHeight::Auto);
    w.choose_archetype(ChartArchetype::Pie);
    assert!(matches!(w.layout().options().height, ChartHeight::Px(_)));
}

#[test]
fn export_saves_to_the_store() {
    let (mut w, store) = wizard();
    to_preview(&mut w);
    let ticket = w.begin_export().unwrap();
    assert!(w.is_exporting());
    assert_eq!(w.begin_export(), Err(ExportRefusal::InFlight));

    assert_eq!(ticket.config.product_refs, vec!["a", "b", "c"]);
    assert_eq!(ticket.config.parameter_names, vec!["价格", "噪音级别"]);
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let ExportOutcome::Saved(record) = w.finish_export_at(ticket, Ok::<_, String>(images()), now)
    else {
        panic!("expected a saved record");
    };
    assert!(!w.is_exporting());
    assert_eq!(record.title, "对比");
    assert_eq!(record.created_at, now);
    assert_eq!(store.len(), 1);
    assert_eq!(w.notices().last().unwrap().level, NoticeLevel::Info);
}

#[test]
fn failed_export_clears_the_in_flight_flag() {
    let (mut w, store) = wizard();
    to_preview(&mut w);
    let ticket = w.begin_export().unwrap();
    let outcome = w.finish_export(ticket, Err::<ExportedImages, _>("canvas tainted"));
    assert_eq!(
        outcome,
        ExportOutcome::Failed("Export failed: canvas tainted".to_string())
    );
    assert!(!w.is_exporting());
    assert!(store.is_empty());
    assert_eq!(w.step(), WizardStep::PreviewExport);
    assert!(w.begin_export().is_ok());
}

#[test]
fn export_results_after_restart_are_discarded() {
    let (mut w, store) = wizard();
    to_preview(&mut w);
    let ticket = w.begin_export().unwrap();
    w.restart();
    assert!(!w.is_exporting());
    assert_eq!(w.step(), WizardStep::SelectProducts);
    assert_eq!(w.finish_export(ticket, Ok::<_, String>(images())), ExportOutcome::Stale);
    assert!(store.is_empty());
    assert_eq!(w.selection().product_count(), 0);
}

#[test]
fn a_ticket_only_finishes_the_export_it_started() {
    let (mut w, store) = wizard();
    let (mut other, _) = wizard();
    to_preview(&mut w);
    to_preview(&mut other);

    let ticket = w.begin_export().unwrap();
    assert!(matches!(
        w.finish_export(ticket, Ok::<_, String>(images())),
        ExportOutcome::Saved(_)
    ));
    assert_eq!(store.len(), 1);

    // Nothing is in flight on `w` any more, so a foreign ticket cannot save a second record.
    let foreign = other.begin_export().unwrap();
    assert_eq!(w.finish_export(foreign, Ok::<_, String>(images())), ExportOutcome::Stale);
    assert_eq!(store.len(), 1);
    assert!(w.begin_export().is_ok());
}

#[test]
fn export_is_only_offered_on_preview() {
    let (mut w, _) = wizard();
    assert_eq!(w.begin_export(), Err(ExportRefusal::NotInPreview));
}

#[test]
fn restart_resets_everything() {
    let (mut w, _) = wizard();
    to_preview(&mut w);
    w.layout_mut().set_width(500.0);
    w.restart();
    assert!(w.spec().is_none());
    assert!(w.archetype().is_none());
    assert_eq!(w.title(), "");
    assert_eq!(w.theme(), Theme::Default);
    assert_eq!(w.layout().options(), &LayoutOptions::default());
    assert!(w.notices().is_empty());
}
