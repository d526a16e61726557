use crate::descriptor::{Category, MemFlags, OperandAvail, OperandTypePolicy, SFormat, Template, VectFlags};

/// Index of the catch-all "reserved long instruction" descriptor. Any
/// descriptor id produced by [`crate::lookup`] that is out of range for
/// [`FORMAT_LIST`] is clamped to this one instead of failing (§4.2 point 4).
pub const RESERVED: usize = 27;

struct Raw {
    form: u16,
    category: Category,
    template: Template,
    op_avail: OperandAvail,
    ot: OperandTypePolicy,
    jump_size: u8,
    jump_pos: u8,
    addr_size: u8,
    addr_pos: u8,
    imm_size: u8,
    imm_pos: u8,
    imm_aux_size: u8,
    imm_aux_pos: u8,
    vect: VectFlags,
    mem: MemFlags,
    scale: u8,
    exe_table: u16,
    op1_low: u8,
    op1_high: u8,
    words: u8,
}

const NONE: OperandAvail = OperandAvail::empty();

macro_rules! raw {
    ($form:expr, $cat:expr, $tpl:expr, $avail:expr, $ot:expr,
     jump($js:expr, $jp:expr), addr($as_:expr, $ap:expr),
     imm($is:expr, $ip:expr, $ias:expr, $iap:expr),
     $vect:expr, $mem:expr, scale($sc:expr), exe($ex:expr), op1($lo:expr, $hi:expr), words($w:expr)) => {
        Raw {
            form: $form,
            category: $cat,
            template: $tpl,
            op_avail: $avail,
            ot: $ot,
            jump_size: $js,
            jump_pos: $jp,
            addr_size: $as_,
            addr_pos: $ap,
            imm_size: $is,
            imm_pos: $ip,
            imm_aux_size: $ias,
            imm_aux_pos: $iap,
            vect: $vect,
            mem: $mem,
            scale: $sc,
            exe_table: $ex,
            op1_low: $lo,
            op1_high: $hi,
            words: $w,
        }
    };
}

fn raw_list() -> Vec<Raw> {
    use OperandAvail as A;
    use OperandTypePolicy::{Forced, TemplateField};

    vec![
        // 0: NOP
        raw!(0x100, Category::Single, Template::A, NONE, Forced(0),
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(0), op1(0, 0), words(1)),
        // 1: MOVE, register-register
        raw!(0x101, Category::Multi, Template::B, A::RD | A::RS, TemplateField,
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(1), op1(1, 1), words(1)),
        // 2: MOVE, register-immediate
        raw!(0x102, Category::Multi, Template::C, A::RD | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(4, 32, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(1), op1(1, 1), words(2)),
        // 3: ADD, register-register
        raw!(0x103, Category::Multi, Template::B, A::RD | A::RS | A::RT, TemplateField,
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(2), op1(2, 2), words(1)),
        // 4: ADD, register-immediate
        raw!(0x104, Category::Multi, Template::C, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(4, 32, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(2), op1(2, 2), words(2)),
        // 5: SUB, register-register
        raw!(0x105, Category::Multi, Template::B, A::RD | A::RS | A::RT, TemplateField,
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(3), op1(3, 3), words(1)),
        // 6: SUB, register-immediate
        raw!(0x106, Category::Multi, Template::C, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(4, 32, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(3), op1(3, 3), words(2)),
        // 7: AND, register-register
        raw!(0x107, Category::Multi, Template::B, A::RD | A::RS | A::RT, TemplateField,
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(4), op1(4, 4), words(1)),
        // 8: AND, register-immediate
        raw!(0x108, Category::Multi, Template::C, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(4, 32, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(4), op1(4, 4), words(2)),
        // 9: OR, register-register
        raw!(0x109, Category::Multi, Template::B, A::RD | A::RS | A::RT, TemplateField,
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(5), op1(5, 5), words(1)),
        // 10: OR, register-immediate
        raw!(0x10A, Category::Multi, Template::C, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(4, 32, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(5), op1(5, 5), words(2)),
        // 11: XOR, register-register
        raw!(0x10B, Category::Multi, Template::B, A::RD | A::RS | A::RT, TemplateField,
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(6), op1(6, 6), words(1)),
        // 12: XOR, register-immediate
        raw!(0x10C, Category::Multi, Template::C, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(4, 32, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(6), op1(6, 6), words(2)),
        // 13: COMPARE, register-register, compiled as a conditional jump carrying
        // the compare's own operands (the condition compiler never emits a bare
        // COMPARE — see compile_compare)
        raw!(0x10D, Category::Jump, Template::B, A::RS | A::RT, TemplateField,
             jump(4, 32), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(7), op1(7, 7), words(2)),
        // 14: COMPARE, register-immediate, compiled as a conditional jump
        raw!(0x10E, Category::Jump, Template::C, A::RS | A::IM1, TemplateField,
             jump(4, 32), addr(0, 0), imm(4, 16, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(7), op1(7, 7), words(2)),
        // 15: TEST_BIT (always a jump, per the condition compiler)
        raw!(0x20F, Category::Jump, Template::E, A::RS | A::IM1, Forced(1),
             jump(4, 32), addr(0, 0), imm(1, 16, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(8), op1(8, 8), words(2)),
        // 16: TEST_BITS_OR
        raw!(0x210, Category::Jump, Template::E, A::RS | A::IM1, TemplateField,
             jump(4, 32), addr(0, 0), imm(4, 16, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(9), op1(9, 9), words(2)),
        // 17: TEST_BITS_AND
        raw!(0x211, Category::Jump, Template::E, A::RS | A::IM1, TemplateField,
             jump(4, 32), addr(0, 0), imm(4, 16, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(10), op1(10, 10), words(2)),
        // 18: JUMP, unconditional short form, no operand
        raw!(0x160, Category::Jump, Template::A, NONE, Forced(0),
             jump(2, 16), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(11), op1(11, 11), words(1)),
        // 19: JUMP, conditional, carries RS (the compiled condition's source register)
        raw!(0x171, Category::Jump, Template::B, A::RS, Forced(0),
             jump(4, 16), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(11), op1(11, 11), words(2)),
        // 20: PUSH
        raw!(0x150, Category::Single, Template::D, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(1, 24, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(12), op1(12, 12), words(1)),
        // 21: POP
        raw!(0x151, Category::Single, Template::D, A::RD | A::RS | A::IM1, TemplateField,
             jump(0, 0), addr(0, 0), imm(1, 24, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(13), op1(13, 13), words(1)),
        // 22: SUB_MAXLEN (always followed by JUMP_POSITIVE in the for-in loop epilogue)
        raw!(0x17A, Category::Jump, Template::C, A::RD, Forced(2),
             jump(4, 32), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(14), op1(14, 14), words(2)),
        // 23: INCREMENT_COMPARE_JUMP_BELOW (jump-merge fusion)
        raw!(0x255, Category::Jump, Template::C, A::RD | A::RS, TemplateField,
             jump(4, 32), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(15), op1(15, 15), words(2)),
        // 24: INCREMENT_COMPARE_JUMP_ABOVE
        raw!(0x255, Category::Jump, Template::C, A::RD | A::RS, TemplateField,
             jump(4, 32), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(16), op1(16, 16), words(2)),
        // 25: ADD_SUB_JUMP_SIGN_ZERO
        raw!(0x254, Category::Jump, Template::C, A::RD | A::RS, TemplateField,
             jump(4, 32), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(17), op1(17, 17), words(2)),
        // 26: LOGIC_JUMP_ZERO
        raw!(0x254, Category::Jump, Template::C, A::RD | A::RS, TemplateField,
             jump(4, 32), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(18), op1(18, 18), words(2)),
        // 27: reserved long instruction
        raw!(0x380, Category::Single, Template::E, NONE, Forced(0),
             jump(0, 0), addr(0, 0), imm(0, 0, 0, 0),
             VectFlags::empty(), MemFlags::empty(), scale(0), exe(u16::MAX), op1(u8::MAX, u8::MAX), words(3)),
    ]
}

/// The concrete list of encoding variants this crate knows, in the order
/// their descriptor ids are assigned. `format_index` is stamped in here
/// rather than written by hand in [`raw_list`], so it can never drift from
/// an entry's real position.
pub fn format_list() -> Vec<SFormat> {
    raw_list()
        .into_iter()
        .enumerate()
        .map(|(i, r)| SFormat {
            form: r.form,
            category: r.category,
            template: r.template,
            op_avail: r.op_avail,
            ot: r.ot,
            jump_size: r.jump_size,
            jump_pos: r.jump_pos,
            addr_size: r.addr_size,
            addr_pos: r.addr_pos,
            imm_size: r.imm_size,
            imm_pos: r.imm_pos,
            imm_aux_size: r.imm_aux_size,
            imm_aux_pos: r.imm_aux_pos,
            vect: r.vect,
            mem: r.mem,
            scale: r.scale,
            format_index: i as u16,
            exe_table: r.exe_table,
            op1_low: r.op1_low,
            op1_high: r.op1_high,
            words: r.words,
        })
        .collect()
}
