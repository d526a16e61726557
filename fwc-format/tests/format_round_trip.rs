//! Format-table round trip (spec Scenario 5): every descriptor, packed
//! through `fit_code` with a shape it's guaranteed to accept, resolves back
//! to its own index through `lookup`.

use fwc_format::{fit_code, format_list, lookup, InstrShape, Opcode, OperandAvail};
use fwc_types::Immediate;

#[test]
fn every_descriptor_survives_pack_then_lookup() {
    let list = format_list();
    let mut checked = 0;

    for descriptor in &list {
        if descriptor.format_index as usize == fwc_format::RESERVED {
            continue;
        }
        let Some(opcode) = Opcode::from_op1(descriptor.op1_low) else {
            continue;
        };

        let shape = InstrShape {
            needs_rt: descriptor.op_avail.contains(OperandAvail::RT),
            needs_rs: descriptor.op_avail.contains(OperandAvail::RS),
            immediate: (descriptor.imm_size > 0).then_some(Immediate::Signed(1)),
            jump_delta: (descriptor.jump_size > 0).then_some(4),
            immediate_unsigned: false,
        };

        let (found, word) = fit_code(opcode, &shape).expect("descriptor should accept its own shape");
        let resolved = lookup(word.lookup_word(), list.len()).expect("lookup should resolve a valid word");
        assert_eq!(resolved, found.format_index as usize);
        checked += 1;
    }

    assert!(checked > 0, "expected at least one descriptor to be exercised");
}
