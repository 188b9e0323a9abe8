//! End-to-end listbox behavior: navigation, focus strategies and selection
//! driven through the public event entry points.

mod common;

use common::{Harness, init_tracing};
use horizon_aria::{
    Direction, ListboxOptions, Orientation, PartialListboxOptions, SelectionMode,
};

fn wrapping() -> ListboxOptions {
    ListboxOptions {
        wrap_key_navigation: true,
        ..Default::default()
    }
}

/// Deterministic pseudo-random sequence for exercising many states.
fn lcg(seed: &mut u64) -> u64 {
    *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *seed >> 33
}

#[test]
fn test_next_stops_at_end_without_wrap() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.set_active(0);

    assert!(h.press("ArrowDown"));
    assert!(h.press("ArrowDown"));
    assert_eq!(h.active_index(), Some(2));

    assert!(!h.press("ArrowDown"));
    assert_eq!(h.active_index(), Some(2));
}

#[test]
fn test_next_wraps_to_start() {
    init_tracing();
    let h = Harness::new(3, wrapping());
    h.set_active(2);
    assert!(h.press("ArrowDown"));
    assert_eq!(h.active_index(), Some(0));
}

#[test]
fn test_first_move_skips_disabled_boundary() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.options[0].set_disabled(true);
    assert_eq!(h.listbox.active().get(), None);

    assert!(h.press("ArrowDown"));
    assert_eq!(h.active_index(), Some(1));
}

#[test]
fn test_multiple_selection_toggles() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.listbox.set_selection_mode(SelectionMode::Multiple);
    h.set_active(1);

    h.press("Enter");
    assert_eq!(h.listbox.selected_values().get(), vec![h.key(1)]);
    h.press("Enter");
    assert!(h.listbox.selected_values().get().is_empty());
}

#[test]
fn test_roving_recovers_from_removed_active() {
    init_tracing();
    let mut h = Harness::roving(3);
    h.set_active(1);
    assert_eq!(h.tabindexes(), vec![Some(-1), Some(0), Some(-1)]);

    h.remove_option(1);
    assert_eq!(h.active_index(), Some(0));
    assert_eq!(h.tabindexes(), vec![Some(0), Some(-1)]);
}

#[test]
fn test_disabled_listbox_hides_active_descendant() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.set_active(1);
    assert_eq!(h.listbox.active_descendant_id().as_deref(), Some(h.options[1].id()));
    assert_eq!(h.listbox.tabindex(), Some(0));

    h.listbox.disabled().set(true);
    assert_eq!(h.listbox.tabindex(), Some(-1));
    assert_eq!(h.listbox.active_descendant_id(), None);
    assert_eq!(h.listbox.active().get(), Some(h.key(1)));

    let attrs = h.listbox.host_attributes();
    assert!(attrs.disabled);
    assert_eq!(attrs.aria_activedescendant, None);
}

#[test]
fn test_navigation_never_lands_on_disabled_option() {
    init_tracing();
    for options in [ListboxOptions::default(), wrapping()] {
        let h = Harness::new(6, options);
        h.options[1].set_disabled(true);
        h.options[4].set_disabled(true);

        let mut seed = 7;
        for _ in 0..200 {
            let key = if lcg(&mut seed) % 2 == 0 { "ArrowDown" } else { "ArrowUp" };
            h.press(key);
            if let Some(index) = h.active_index() {
                assert!(!h.options[index].disabled().get(), "landed on disabled {index}");
            }
            assert!(h.listbox.active().get().is_none() || h.active_index().is_some());
        }
        assert!(h.active_index().is_some());
    }
}

#[test]
fn test_roving_has_one_tab_stop_when_enabled() {
    init_tracing();
    let h = Harness::roving(5);
    let mut seed = 42;
    for _ in 0..300 {
        match lcg(&mut seed) % 5 {
            0 => {
                let option = &h.options[(lcg(&mut seed) % 5) as usize];
                option.set_disabled(!option.disabled().get());
            }
            1 => {
                let disabled = h.listbox.disabled().get();
                h.listbox.disabled().set(!disabled);
            }
            2 => h.set_active((lcg(&mut seed) % 5) as usize),
            3 => {
                h.press("ArrowDown");
            }
            _ => {
                h.press("ArrowUp");
            }
        }

        let any_enabled = h.options.iter().any(|option| !option.disabled().get());
        let expected = usize::from(any_enabled && !h.listbox.is_effectively_disabled());
        assert_eq!(h.tab_stops(), expected);
        if expected == 1 {
            let index = h.active_index().expect("roving target is active");
            assert_eq!(h.options[index].tabindex(), Some(0));
        }
    }
}

#[test]
fn test_roving_rejects_disabled_or_absent_active() {
    init_tracing();
    let mut h = Harness::roving(4);
    h.set_active(2);
    h.options[1].set_disabled(true);

    // Falls back to the first enabled option.
    h.set_active(1);
    assert_eq!(h.active_index(), Some(0));
    assert_eq!(h.tabindexes(), vec![Some(0), Some(-1), Some(-1), Some(-1)]);

    h.set_active(2);
    let removed = h.remove_option(3);
    h.listbox.active().set(Some(removed.key()));
    assert_eq!(h.active_index(), Some(0));
    assert_eq!(h.tabindexes(), vec![Some(0), Some(-1), Some(-1)]);
    assert_eq!(h.tab_stops(), 1);
}

#[test]
fn test_selection_follows_active_without_keys() {
    init_tracing();
    let h = Harness::new(4, ListboxOptions::default());
    for index in [2, 0, 3] {
        h.set_active(index);
        assert_eq!(h.listbox.selected().get(), Some(h.key(index)));
    }
}

#[test]
fn test_independent_selection_needs_activation() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.listbox.set_options(PartialListboxOptions {
        selection_follows_focus: Some(false),
        ..Default::default()
    });

    h.press("ArrowDown");
    h.press("ArrowDown");
    assert_eq!(h.listbox.selected().get(), None);

    h.press(" ");
    assert_eq!(h.listbox.selected().get(), Some(h.key(1)));
    assert_eq!(
        h.listbox.option_attributes(&h.options[1]).aria_selected,
        Some(true)
    );
}

#[test]
fn test_reconfigure_leaves_no_stale_listeners() {
    init_tracing();
    let h = Harness::new(4, ListboxOptions::default());
    h.set_active(0);

    let partial = PartialListboxOptions::from_toml("useActiveDescendant = false").unwrap();
    h.listbox.set_options(partial);
    h.listbox.set_options(partial);
    assert_eq!(
        h.listbox.behavior_names(),
        vec!["ListSingleSelection", "ListKeyNavigation", "RovingTabindex"]
    );

    h.press("ArrowDown");
    assert_eq!(h.active_index(), Some(1));
    assert_eq!(h.listbox.active_descendant_id(), None);
    assert_eq!(h.listbox.tabindex(), Some(-1));
    assert_eq!(h.tab_stops(), 1);
}

#[test]
fn test_roving_focus_follows_active() {
    init_tracing();
    let h = Harness::roving(3);
    h.focus_in();
    assert_eq!(h.focused_option(), Some(0));

    h.press("ArrowDown");
    assert_eq!(h.focused_option(), Some(1));

    h.focus_out();
    h.press("ArrowDown");
    assert_eq!(h.doc.focused(), None);
    assert_eq!(h.active_index(), Some(2));
}

#[test]
fn test_active_descendant_keeps_focus_on_listbox() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.focus_in();
    assert_eq!(h.doc.focused(), Some(0));

    h.press("ArrowDown");
    assert_eq!(h.doc.focused(), Some(0));
    assert_eq!(h.tabindexes(), vec![Some(-1); 3]);
    assert_eq!(
        h.listbox.host_attributes().aria_activedescendant.as_deref(),
        Some(h.options[0].id())
    );
}

#[test]
fn test_horizontal_rtl_navigation() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.listbox.orientation().set(Orientation::Horizontal);
    h.listbox.direction().set(Direction::Rtl);
    h.set_active(1);

    assert!(!h.press("ArrowDown"));
    assert!(h.press("ArrowLeft"));
    assert_eq!(h.active_index(), Some(2));
    assert!(h.press("ArrowRight"));
    assert_eq!(h.active_index(), Some(1));
    assert_eq!(
        h.listbox.host_attributes().aria_orientation,
        Orientation::Horizontal
    );
}

#[test]
fn test_disabled_selection_blocks_listbox() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.set_active(1);
    assert_eq!(h.listbox.selected().get(), Some(h.key(1)));

    h.options[1].set_disabled(true);
    assert!(h.listbox.is_effectively_disabled());
    assert!(!h.press("ArrowDown"));
    assert_eq!(h.listbox.selected().get(), Some(h.key(1)));

    h.options[1].set_disabled(false);
    assert!(!h.listbox.is_effectively_disabled());
    assert!(h.press("ArrowDown"));
}

#[test]
fn test_no_selection_mode() {
    init_tracing();
    let h = Harness::new(3, ListboxOptions::default());
    h.listbox.set_selection_mode(SelectionMode::None);
    h.listbox.selected().set(None);
    h.press("ArrowDown");
    h.press("Enter");
    assert_eq!(h.listbox.selected().get(), None);
    assert!(h.listbox.selected_values().get().is_empty());
    assert_eq!(h.listbox.option_attributes(&h.options[0]).aria_selected, None);
}
