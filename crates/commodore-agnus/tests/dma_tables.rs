mod common;

use commodore_agnus::regs::{
    BPL1PTH, BPLCON0, DDFSTOP, DDFSTRT, DIWSTOP, DIWSTRT, DMACON_AUD0EN, DMACON_AUD2EN,
    DMACON_BPLEN, DMACON_SPREN, SPR0PTH,
};
use commodore_agnus::tables::bpl_line_terminates;
use commodore_agnus::{Agnus, AgnusConfig, BusOwner, EventId};
use common::{RecordingHost, agnus, enable_dma, poke, poke_ptr, run_to, step};

const PLANE0_DATA: u32 = 0x2000;

fn four_plane_lores() -> (Agnus, RecordingHost) {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());

    let data: Vec<u16> = (0..64).map(|i| 0xA000 + i).collect();
    host.load(PLANE0_DATA, &data);
    poke_ptr(&mut agnus, BPL1PTH, PLANE0_DATA);

    poke(&mut agnus, DIWSTRT, 0x2C81);
    poke(&mut agnus, DIWSTOP, 0x2CC1);
    poke(&mut agnus, DDFSTRT, 0x0018);
    poke(&mut agnus, DDFSTOP, 0x0030);
    poke(&mut agnus, BPLCON0, 0x4200);
    enable_dma(&mut agnus, DMACON_BPLEN);
    (agnus, host)
}

#[test]
fn four_lores_planes_fetch_in_unit_order() {
    let (mut agnus, mut host) = four_plane_lores();
    run_to(&mut agnus, &mut host, 0x2C, 0x10);

    assert_eq!(agnus.dma_window().0, (0x18, 0x38));

    let line = agnus.bpl_events();
    for unit in (0x18..0x38).step_by(8) {
        assert_eq!(line.event(unit + 1), EventId::BplLores(3), "unit {unit:02X}");
        assert_eq!(line.event(unit + 3), EventId::BplLores(1), "unit {unit:02X}");
        assert_eq!(line.event(unit + 5), EventId::BplLores(2), "unit {unit:02X}");
        assert_eq!(line.event(unit + 7), EventId::BplLores(0), "unit {unit:02X}");
        for free in [0, 2, 4, 6] {
            assert_eq!(line.event(unit + free), EventId::None);
        }
    }
    assert_eq!(line.next_after(0x37), Some(226));
    assert_eq!(line.event(226), EventId::BplEol);
    assert!(line.jump_table_is_consistent());

    run_to(&mut agnus, &mut host, 0x2E, 0);
    assert_eq!(host.planes_in_line(0x2C), [3, 1, 2, 0].repeat(4));
    assert!(host.planes_in_line(0x2B).is_empty());
}

#[test]
fn bitplane_pointer_advances_across_lines() {
    let (mut agnus, mut host) = four_plane_lores();
    run_to(&mut agnus, &mut host, 0x2E, 0);

    let plane0 = |v: u16| -> Vec<u16> {
        host.bitplane_words.iter().filter(|(line, p, _)| *line == v && *p == 0).map(|(_, _, w)| *w).collect()
    };
    assert_eq!(plane0(0x2C), [0xA000, 0xA001, 0xA002, 0xA003]);
    assert_eq!(plane0(0x2D), [0xA004, 0xA005, 0xA006, 0xA007]);
    assert_eq!(agnus.bpl_pt[0], PLANE0_DATA + 16);
}

#[test]
fn lines_outside_the_window_carry_only_the_end_marker() {
    let (mut agnus, mut host) = four_plane_lores();
    run_to(&mut agnus, &mut host, 0x20, 0x40);
    assert_eq!(agnus.bpl_events().next_after(0), Some(226));
    assert!(bpl_line_terminates(agnus.bpl_events()));

    // DIWSTOP $2CC1 closes the window at line $12C
    run_to(&mut agnus, &mut host, 0x12C, 0x40);
    assert_eq!(agnus.bpl_events().next_after(0), Some(226));
    assert!(!agnus.diw_flops().0);
}

#[test]
fn tables_stay_consistent_through_a_frame() {
    let (mut agnus, mut host) = four_plane_lores();
    for v in (0..312).step_by(7) {
        run_to(&mut agnus, &mut host, v, 0x80);
        assert!(agnus.bpl_events().jump_table_is_consistent(), "line {v}");
        assert!(agnus.das_events().jump_table_is_consistent(), "line {v}");
        assert!(bpl_line_terminates(agnus.bpl_events()), "line {v}");
    }
}

#[test]
fn display_window_decoding() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());

    poke(&mut agnus, DIWSTRT, 0x2C81);
    poke(&mut agnus, DIWSTOP, 0x2CC1);
    step(&mut agnus, &mut host, 4);
    assert_eq!(agnus.diw_edges(), (0x2C, 0x12C, 0x81, 0x1C1));

    // V7 set: no implicit V8
    poke(&mut agnus, DIWSTOP, 0xF4C1);
    step(&mut agnus, &mut host, 4);
    assert_eq!(agnus.diw_edges().1, 0xF4);

    // Start below 2 and stop beyond $1C7 never trigger
    poke(&mut agnus, DIWSTRT, 0x2C01);
    poke(&mut agnus, DIWSTOP, 0x2CC8);
    step(&mut agnus, &mut host, 4);
    assert_eq!(agnus.diw_edges().2, -1);
    assert_eq!(agnus.diw_edges().3, -1);
}

#[test]
fn vertical_window_flop_follows_diwstrt_and_diwstop() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    poke(&mut agnus, DIWSTRT, 0x4081);
    poke(&mut agnus, DIWSTOP, 0xF0C1);

    run_to(&mut agnus, &mut host, 0x3F, 0x10);
    assert!(!agnus.diw_flops().0);
    run_to(&mut agnus, &mut host, 0x40, 0x10);
    assert!(agnus.diw_flops().0);
    run_to(&mut agnus, &mut host, 0xEF, 0x10);
    assert!(agnus.diw_flops().0);
    run_to(&mut agnus, &mut host, 0xF0, 0x10);
    assert!(!agnus.diw_flops().0);
}

#[test]
fn single_audio_channel_uses_its_own_slot() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    enable_dma(&mut agnus, DMACON_AUD2EN);
    step(&mut agnus, &mut host, 4);

    let das = agnus.das_events();
    assert_eq!(das.event(0x11), EventId::DasAudio(2));
    for other in [0x0D, 0x0F, 0x13] {
        assert_eq!(das.event(other), EventId::None, "slot {other:02X}");
    }
    assert!(matches!(das.event(0x07), EventId::DasDisk(_)));
    assert!(das.jump_table_is_consistent());

    // The row survives the next HSYNC
    run_to(&mut agnus, &mut host, 5, 0x20);
    assert_eq!(agnus.das_events().event(0x11), EventId::DasAudio(2));
    assert_eq!(agnus.das_events().event(0x0D), EventId::None);
}

#[test]
fn dmacon_changes_reach_the_video_side() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    enable_dma(&mut agnus, DMACON_BPLEN);
    step(&mut agnus, &mut host, 4);
    assert_eq!(host.dmacon_changes, [(0x0000, 0x0300)]);

    // Writing the same bits again changes nothing
    enable_dma(&mut agnus, DMACON_BPLEN);
    step(&mut agnus, &mut host, 4);
    assert_eq!(host.dmacon_changes.len(), 1);
}

const SPRITE_DATA: u32 = 0x3000;

/// Sprite `nr` reads its words from `SPRITE_DATA + nr * $100`.
fn point_sprites(agnus: &mut Agnus) {
    for nr in 0..8u16 {
        poke_ptr(agnus, SPR0PTH + 4 * nr, SPRITE_DATA + 0x100 * u32::from(nr));
    }
}

/// Bitplanes and sprites with DDFSTRT at $18, so fetch units overlap the
/// sprite slots.
fn early_fetch_with_sprites(diwstrt: u16, bplcon0: u16) -> (Agnus, RecordingHost) {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    point_sprites(&mut agnus);
    poke(&mut agnus, DIWSTRT, diwstrt);
    poke(&mut agnus, DIWSTOP, 0x2CC1);
    poke(&mut agnus, DDFSTRT, 0x0018);
    poke(&mut agnus, DDFSTOP, 0x00D0);
    poke(&mut agnus, BPLCON0, bplcon0);
    enable_dma(&mut agnus, DMACON_BPLEN | DMACON_SPREN);
    (agnus, host)
}

#[test]
fn bitplanes_take_over_sprite_slots_in_the_control_word_line() {
    let (mut agnus, mut host) = early_fetch_with_sprites(0x1881, 0x4200);

    // Line 25 fetches the control words of every sprite
    run_to(&mut agnus, &mut host, 25, 0x40);
    let bus = agnus.bus();
    assert_eq!(bus.owner(0x15), BusOwner::Sprite);
    assert_eq!(bus.owner(0x17), BusOwner::Sprite);
    for h in [0x19, 0x1B, 0x1D, 0x1F] {
        assert_eq!(bus.owner(h), BusOwner::Bitplane, "slot {h:02X}");
    }

    // Sprite 0 got both words; the others lost their slots to bitplanes
    assert_eq!(agnus.spr_pt[0], SPRITE_DATA + 4);
    for nr in 1..8 {
        assert_eq!(agnus.spr_pt[nr], SPRITE_DATA + 0x100 * nr as u32, "sprite {nr}");
    }

    agnus.execute_frame(&mut host);
    agnus.execute_frame(&mut host);
    assert_eq!(host.frames, 2);
}

#[test]
fn active_sprite_loses_only_the_slots_bitplanes_claim() {
    let (mut agnus, mut host) = early_fetch_with_sprites(0x2C81, 0x3200);

    // Sprite 1 shows from line $30 to $40
    host.load(SPRITE_DATA + 0x100, &[0x3040, 0x4000, 0x1111, 0x2222, 0x3333, 0x4444]);

    run_to(&mut agnus, &mut host, 0x32, 0x40);

    // Three lores planes use unit offsets 3, 5 and 7. Slot $19 stays free
    // for the first data word of sprite 1, $1B goes to plane 1.
    let bus = agnus.bus();
    assert_eq!(bus.owner(0x19), BusOwner::Sprite);
    assert_eq!(bus.owner(0x1B), BusOwner::Bitplane);
    assert_eq!(bus.owner(0x1D), BusOwner::Bitplane);
    assert_eq!(bus.owner(0x1F), BusOwner::Bitplane);

    // Control words in line 25, then one word in each of lines $30 to $32
    assert_eq!(agnus.spr_pt[1], SPRITE_DATA + 0x100 + 4 + 3 * 2);
    assert_eq!(host.planes_in_line(0x32)[..3], [1, 2, 0]);

    agnus.execute_frame(&mut host);
    agnus.execute_frame(&mut host);
    assert_eq!(host.frames, 2);
}

#[test]
fn bitplane_and_das_tables_are_built_together() {
    let (mut agnus, mut host) = four_plane_lores();
    point_sprites(&mut agnus);
    enable_dma(&mut agnus, DMACON_SPREN | DMACON_AUD0EN);
    run_to(&mut agnus, &mut host, 0x2C, 0x10);

    let bpl = agnus.bpl_events();
    assert_eq!(bpl.event(0x19), EventId::BplLores(3));
    assert_eq!(bpl.event(0x1F), EventId::BplLores(0));
    assert_eq!(bpl.event(226), EventId::BplEol);
    assert!(bpl.jump_table_is_consistent());

    let das = agnus.das_events();
    assert_eq!(das.event(0x01), EventId::DasRefresh);
    assert_eq!(das.event(0x0D), EventId::DasAudio(0));
    assert_eq!(das.event(0x0F), EventId::None);
    assert_eq!(das.event(0x15), EventId::DasSpriteFirst(0));
    assert_eq!(das.event(0x17), EventId::DasSpriteSecond(0));
    assert_eq!(das.event(0x19), EventId::DasSpriteFirst(1));
    assert_eq!(das.event(0xDF), EventId::DasSdma);
    assert!(das.jump_table_is_consistent());

    // Both rows are live in the same line
    run_to(&mut agnus, &mut host, 0x2D, 0x40);
    let bus = agnus.bus();
    assert_eq!(bus.owner(0x01), BusOwner::Refresh);
    assert_eq!(bus.owner(0x19), BusOwner::Bitplane);
    assert_eq!(bus.owner(0x1F), BusOwner::Bitplane);
    assert_eq!(host.planes_in_line(0x2C), [3, 1, 2, 0].repeat(4));
}
