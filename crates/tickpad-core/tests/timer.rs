use tickpad_core::registers::{DIV, IF, IoRegisters, RegisterFile, TAC, TIMA, TMA};
use tickpad_core::timer::{DIV_PERIOD, Timer, TimerControl};

fn regs_with_tac(tac: u8) -> IoRegisters {
    let mut regs = IoRegisters::new();
    regs.set(IF, 0);
    regs.set(TAC, tac);
    regs
}

#[test]
fn div_increment() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0);
    t.step(256, &mut regs);
    assert_eq!(regs.get(DIV), 1);
    assert_eq!(regs.get(IF), 0);
}

#[test]
fn div_single_step_matches_unit_steps() {
    let mut bulk = Timer::new();
    let mut bulk_regs = regs_with_tac(0);
    bulk.step(256, &mut bulk_regs);

    let mut unit = Timer::new();
    let mut unit_regs = regs_with_tac(0);
    for _ in 0..256 {
        unit.step(1, &mut unit_regs);
    }

    assert_eq!(bulk_regs.get(DIV), unit_regs.get(DIV));
    assert_eq!(bulk.state(), unit.state());
}

#[test]
fn div_is_additive_over_instruction_costs() {
    let costs = [4u16, 8, 12, 16, 20, 24, 4, 4, 8];
    let mut stepped = Timer::new();
    let mut stepped_regs = regs_with_tac(0);
    let mut total = 0u16;
    for _ in 0..100 {
        for &c in &costs {
            stepped.step(c, &mut stepped_regs);
            total += c;
        }
    }

    let mut bulk = Timer::new();
    let mut bulk_regs = regs_with_tac(0);
    bulk.step(total, &mut bulk_regs);

    assert_eq!(stepped_regs.get(DIV), bulk_regs.get(DIV));
    assert_eq!(stepped_regs.get(DIV), (u32::from(total) / DIV_PERIOD) as u8);
}

#[test]
fn div_applies_every_wrap_in_one_step() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0);
    t.step(1024 + 100, &mut regs);
    assert_eq!(regs.get(DIV), 4);
    assert_eq!(t.state().div_cycles, 100);
}

#[test]
fn div_wraps_without_interrupt() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0);
    t.step(0xFF00, &mut regs);
    assert_eq!(regs.get(DIV), 0xFF);
    t.step(256, &mut regs);
    assert_eq!(regs.get(DIV), 0);
    assert_eq!(regs.get(IF), 0);
}

#[test]
fn zero_cycles_is_a_no_op() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x05);
    t.step(10, &mut regs);
    let before = (regs.clone(), t.state());
    t.step(0, &mut regs);
    assert_eq!((regs, t.state()), before);
}

#[test]
fn tima_ticks_at_fastest_clock() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x05);
    t.step(16, &mut regs);
    assert_eq!(regs.get(TIMA), 1);
    assert_eq!(regs.get(IF), 0);
}

#[test]
fn tima_increment_and_overflow() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x04);
    t.step(1024, &mut regs);
    assert_eq!(regs.get(TIMA), 1);
    assert_eq!(regs.get(IF), 0);

    regs.set(TIMA, 0xFF);
    regs.set(TMA, 0x10);
    t.step(1024, &mut regs);
    assert_eq!(regs.get(TIMA), 0x10);
    assert_eq!(regs.get(IF) & 0x04, 0x04);
}

#[test]
fn tima_counts_whole_periods() {
    for tac in 0x04..=0x07u8 {
        let period = TimerControl::from(tac).clock.period();
        let mut t = Timer::new();
        let mut regs = regs_with_tac(tac);
        t.step((period * 3) as u16, &mut regs);
        assert_eq!(regs.get(TIMA), 3, "TAC={tac:02X}");
        assert_eq!(t.state().tima_cycles, 0, "TAC={tac:02X}");
    }
}

#[test]
fn tima_count_wraps_modulo_256_with_zero_modulo() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x05);
    t.step(16 * 300, &mut regs);
    assert_eq!(regs.get(TIMA), 44);
    assert_eq!(regs.get(IF) & 0x04, 0x04);
}

#[test]
fn each_overflow_in_one_step_reloads() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x06);
    regs.set(TIMA, 0xFE);
    regs.set(TMA, 0xF0);
    t.step(64 * 5, &mut regs);
    // FE -> FF -> reload F0 -> F1 -> F2 -> F3
    assert_eq!(regs.get(TIMA), 0xF3);
    assert_eq!(regs.get(IF), 0x04);

    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x05);
    regs.set(TIMA, 0xFF);
    regs.set(TMA, 0xFE);
    t.step(16 * 4, &mut regs);
    assert_eq!(regs.get(TIMA), 0xFF);
    assert_eq!(regs.get(IF), 0x04);
}

#[test]
fn overflow_leaves_pending_interrupt_untouched() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x05);
    regs.set(IF, 0x14);
    regs.set(TIMA, 0xFF);
    regs.set(TMA, 0x80);
    t.step(16, &mut regs);
    assert_eq!(regs.get(TIMA), 0x80);
    assert_eq!(regs.get(IF), 0x14);
}

#[test]
fn disabled_timer_leaves_tima_alone() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x01);
    regs.set(TIMA, 0xFF);
    t.step(4000, &mut regs);
    assert_eq!(regs.get(TIMA), 0xFF);
    assert_eq!(regs.get(IF), 0);
    assert_eq!(regs.get(DIV), 15);
}

// The TIMA remainder keeps advancing while TAC is disabled, so the first tick
// after enabling comes early. Pinned deliberately; change together with the
// timer if the remainder should freeze instead.
#[test]
fn disabled_timer_keeps_accumulating() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x00);
    t.step(1000, &mut regs);
    assert_eq!(t.state().tima_cycles, 1000);
    assert_eq!(regs.get(TIMA), 0);

    t.step(100, &mut regs);
    assert_eq!(t.state().tima_cycles, 76);

    regs.set(TAC, 0x04);
    t.step(948, &mut regs);
    assert_eq!(regs.get(TIMA), 1);
    assert_eq!(t.state().tima_cycles, 0);
}

#[test]
fn switching_to_faster_clock_flushes_remainder() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x04);
    t.step(1000, &mut regs);
    assert_eq!(regs.get(TIMA), 0);

    regs.set(TAC, 0x05);
    t.step(8, &mut regs);
    assert_eq!(regs.get(TIMA), 63);
    assert_eq!(t.state().tima_cycles, 0);
}

#[test]
fn accumulators_stay_below_their_periods() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x07);
    for c in [1u16, 255, 256, 257, 1023, 4, 24, 0xFFFF] {
        t.step(c, &mut regs);
        let state = t.state();
        assert!(state.div_cycles < DIV_PERIOD);
        assert!(state.tima_cycles < 256);
    }
}

#[test]
fn largest_step_is_handled() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x05);
    t.step(u16::MAX, &mut regs);
    assert_eq!(regs.get(DIV), 0xFF);
    assert_eq!(regs.get(TIMA), 0xFF);
    assert_eq!(t.state().div_cycles, 255);
    assert_eq!(t.state().tima_cycles, 15);
}

#[test]
fn div_resets_on_write() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0);
    t.step(300, &mut regs);
    assert_eq!(regs.get(DIV), 1);

    t.reset_divider(&mut regs);
    assert_eq!(regs.get(DIV), 0);
    assert_eq!(t.state().div_cycles, 0);

    t.step(255, &mut regs);
    assert_eq!(regs.get(DIV), 0);
    t.step(1, &mut regs);
    assert_eq!(regs.get(DIV), 1);
}

#[test]
fn restore_resumes_mid_period() {
    let mut t = Timer::new();
    let mut regs = regs_with_tac(0x04);
    t.step(1000, &mut regs);
    let saved = t.state();

    let mut resumed = Timer::new();
    resumed.restore(saved);
    resumed.step(24, &mut regs);
    assert_eq!(regs.get(TIMA), 1);

    resumed.reset();
    assert_eq!(resumed.state().tima_cycles, 0);
    assert_eq!(resumed.state().div_cycles, 0);
}
