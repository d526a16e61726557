// Concrete nested lookup tables backing `lookup()`. Kept in its own file
// purely so `lookup.rs` isn't dominated by table literals; it is spliced
// into `lookup`'s module scope with `include!`, not a separate module.

const L2_BASE: u16 = 0;
const L3A_BASE: u16 = 8;
const L3B_BASE: u16 = 16;
const L3C_BASE: u16 = 24;
const L4_MOVE_BASE: u16 = 32;
const L4_ADD_BASE: u16 = 34;
const L4_SUB_BASE: u16 = 36;
const L4_AND_BASE: u16 = 38;
const L4_OR_BASE: u16 = 40;
const L4_XOR_BASE: u16 = 42;
const L4_COMPARE_BASE: u16 = 44;
const L4_JUMP_BASE: u16 = 46;

/// `il.mode.M` first-level table. Only index 8 (`il=1, mode=0, M=0`) is
/// populated by this crate's concrete formats; every other combination
/// resolves straight to the reserved slot.
static FIRST_LEVEL: [LookupEntry; 40] = {
    let mut t = [id(RESERVED as u16); 40];
    t[8] = sub(2, L2_BASE);
    t
};

static TABLE_ARENA: [LookupEntry; 48] = {
    let mut t = [id(RESERVED as u16); 48];

    // L2: subdivide by op1 / 8.
    t[L2_BASE as usize] = sub(3, L3A_BASE);
    t[L2_BASE as usize + 1] = sub(3, L3B_BASE);
    t[L2_BASE as usize + 2] = sub(3, L3C_BASE);

    // L3A: op1 % 8 for op1 0-7.
    t[L3A_BASE as usize] = id(0); // NOP
    t[L3A_BASE as usize + 1] = sub(8, L4_MOVE_BASE);
    t[L3A_BASE as usize + 2] = sub(8, L4_ADD_BASE);
    t[L3A_BASE as usize + 3] = sub(8, L4_SUB_BASE);
    t[L3A_BASE as usize + 4] = sub(8, L4_AND_BASE);
    t[L3A_BASE as usize + 5] = sub(8, L4_OR_BASE);
    t[L3A_BASE as usize + 6] = sub(8, L4_XOR_BASE);
    t[L3A_BASE as usize + 7] = sub(8, L4_COMPARE_BASE);

    // L3B: op1 % 8 for op1 8-15.
    t[L3B_BASE as usize] = id(15); // TEST_BIT
    t[L3B_BASE as usize + 1] = id(16); // TEST_BITS_OR
    t[L3B_BASE as usize + 2] = id(17); // TEST_BITS_AND
    t[L3B_BASE as usize + 3] = sub(8, L4_JUMP_BASE);
    t[L3B_BASE as usize + 4] = id(20); // PUSH
    t[L3B_BASE as usize + 5] = id(21); // POP
    t[L3B_BASE as usize + 6] = id(22); // SUB_MAXLEN
    t[L3B_BASE as usize + 7] = id(23); // INCREMENT_COMPARE_JUMP_BELOW

    // L3C: op1 % 8 for op1 16-23.
    t[L3C_BASE as usize] = id(24); // INCREMENT_COMPARE_JUMP_ABOVE
    t[L3C_BASE as usize + 1] = id(25); // ADD_SUB_JUMP_SIGN_ZERO
    t[L3C_BASE as usize + 2] = id(26); // LOGIC_JUMP_ZERO

    // L4: register/immediate variant, chosen by the IM12 marker.
    t[L4_MOVE_BASE as usize] = id(1);
    t[L4_MOVE_BASE as usize + 1] = id(2);
    t[L4_ADD_BASE as usize] = id(3);
    t[L4_ADD_BASE as usize + 1] = id(4);
    t[L4_SUB_BASE as usize] = id(5);
    t[L4_SUB_BASE as usize + 1] = id(6);
    t[L4_AND_BASE as usize] = id(7);
    t[L4_AND_BASE as usize + 1] = id(8);
    t[L4_OR_BASE as usize] = id(9);
    t[L4_OR_BASE as usize + 1] = id(10);
    t[L4_XOR_BASE as usize] = id(11);
    t[L4_XOR_BASE as usize + 1] = id(12);
    t[L4_COMPARE_BASE as usize] = id(13);
    t[L4_COMPARE_BASE as usize + 1] = id(14);
    t[L4_JUMP_BASE as usize] = id(18);
    t[L4_JUMP_BASE as usize + 1] = id(19);

    t
};
