mod common;

use commodore_agnus::beam::{HPOS_CNT, LINES_LONG_FRAME, LINES_SHORT_FRAME, dma_cycles};
use commodore_agnus::regs::{
    BPL1PTH, BPLCON0, COP1LCH, DDFSTOP, DDFSTRT, DIWSTOP, DIWSTRT, DMACON_BPLEN, DMACON_COPEN,
    INT_VERTB,
};
use commodore_agnus::{Agnus, AgnusConfig};
use common::{RecordingHost, agnus, enable_dma, poke, poke_ptr};

/// Two bitplanes and a copper list that changes the plane count mid-frame.
fn busy_machine() -> (Agnus, RecordingHost) {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());

    host.load(0x1000, &[
        0x0180, 0x0F00,
        0x8001, 0xFFFE,
        BPLCON0, 0x3200,
        0xFFFF, 0xFFFE,
    ]);
    let data: Vec<u16> = (0..0x800).map(|i| i as u16 ^ 0x5A5A).collect();
    host.load(0x4000, &data);

    poke_ptr(&mut agnus, COP1LCH, 0x1000);
    poke_ptr(&mut agnus, BPL1PTH, 0x4000);
    poke_ptr(&mut agnus, BPL1PTH + 4, 0x4400);
    poke(&mut agnus, DIWSTRT, 0x2C81);
    poke(&mut agnus, DIWSTOP, 0x2CC1);
    poke(&mut agnus, DDFSTRT, 0x0038);
    poke(&mut agnus, DDFSTOP, 0x00D0);
    poke(&mut agnus, BPLCON0, 0x2200);
    enable_dma(&mut agnus, DMACON_BPLEN | DMACON_COPEN);
    (agnus, host)
}

#[test]
fn skipping_idle_cycles_matches_stepping() {
    let (mut batched, mut batched_host) = busy_machine();
    let (mut stepped, mut stepped_host) = busy_machine();

    batched.execute_frame(&mut batched_host);
    batched.execute_frame(&mut batched_host);

    while stepped.frame.nr < 2 {
        stepped.execute(&mut stepped_host);
    }

    assert_eq!(batched.inspect(), stepped.inspect());
    assert_eq!(batched_host.bitplane_words, stepped_host.bitplane_words);
    assert_eq!(batched_host.pokes, stepped_host.pokes);
    assert_eq!(batched_host.irqs, stepped_host.irqs);
    assert!(!batched_host.bitplane_words.is_empty());

    // Three planes after the copper's BPLCON0 write
    assert!(batched_host.planes_in_line(0x90).contains(&2));
    assert!(!batched_host.planes_in_line(0x50).contains(&2));
}

#[test]
fn execute_until_stops_short_of_the_next_trigger() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    agnus.execute(&mut host);

    let trigger = agnus.next_trigger();
    agnus.execute_until(trigger, &mut host);
    assert_eq!(agnus.clock, trigger);
    // The trigger cycle has not been dispatched yet
    assert_eq!(agnus.next_trigger(), trigger);

    agnus.execute(&mut host);
    assert!(agnus.next_trigger() > trigger);
}

#[test]
fn execute_until_ignores_targets_in_the_past() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    agnus.execute_until(dma_cycles(10), &mut host);
    agnus.execute_until(dma_cycles(5), &mut host);
    assert_eq!(agnus.clock, dma_cycles(10));
    assert_eq!(agnus.pos.h, 10);
}

#[test]
fn frame_ends_in_the_first_cycle_of_the_next() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    agnus.execute_frame(&mut host);

    assert_eq!(agnus.frame.nr, 1);
    assert_eq!((agnus.pos.v, agnus.pos.h), (0, 1));
    assert_eq!(agnus.clock, dma_cycles(i64::from(LINES_LONG_FRAME) * i64::from(HPOS_CNT) + 1));
    assert_eq!(host.frames, 1);
    assert!(host.irqs.contains(&INT_VERTB));
}

#[test]
fn interlace_alternates_long_and_short_frames() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    // LACE
    poke(&mut agnus, BPLCON0, 0x0004);

    let mut lines = Vec::new();
    for _ in 0..4 {
        agnus.execute_frame(&mut host);
        lines.push(agnus.frame.num_lines);
    }
    assert_eq!(lines, [LINES_SHORT_FRAME, LINES_LONG_FRAME, LINES_SHORT_FRAME, LINES_LONG_FRAME]);
    assert!(agnus.frame.interlaced);
}

#[test]
fn cycles_map_back_to_beam_positions() {
    let mut host = RecordingHost::new();
    let mut agnus = agnus(AgnusConfig::default());
    agnus.execute_until(dma_cycles(3 * i64::from(HPOS_CNT) + 0x40), &mut host);

    let beam = agnus.cycle_to_beam(agnus.clock + dma_cycles(10));
    assert_eq!((beam.v, beam.h), (3, 0x4A));
    assert_eq!(agnus.beam_to_cycle(beam), agnus.clock + dma_cycles(10));
    assert!(agnus.belongs_to_current_frame(agnus.clock));
    assert!(agnus.belongs_to_next_frame(agnus.start_of_next_frame()));
}
