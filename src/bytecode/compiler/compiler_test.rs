use crate::bytecode::{
    module::{Constant, Module},
    op_code::{Decoded, OpCode, decode, disassemble},
};

use super::{CompileError, compile};

fn compile_source(source: &str) -> Module {
    let mut program = match crate::syntax::parse(source) {
        Ok(program) => program,
        Err(errors) => panic!("parse errors: {:?}", errors),
    };
    if let Err(errors) = crate::analysis::resolve(&mut program) {
        panic!("resolve errors: {:?}", errors);
    }
    match compile(&program) {
        Ok(module) => module,
        Err(error) => panic!("compile error: {}", error),
    }
}

fn decoded(module: &Module, function: usize) -> Vec<Decoded> {
    decode(&module.functions[function].instructions)
        .map(|item| item.expect("valid instruction"))
        .collect()
}

fn operands_of(code: &[Decoded], op: OpCode) -> Vec<usize> {
    code.iter()
        .filter(|d| d.op == op)
        .filter_map(|d| d.operand)
        .map(usize::from)
        .collect()
}

#[test]
fn top_level_let_stores_into_root_local() {
    let module = compile_source("let a = 1 + 2;");

    assert_eq!(module.constants, vec![Constant::Int(1), Constant::Int(2)]);
    assert_eq!(module.functions.len(), 1);
    assert_eq!(module.functions[0].num_locals, 1);
    insta::assert_snapshot!(disassemble(&module.functions[0].instructions), @r"
    0000 OpConstant 0
    0003 OpConstant 1
    0006 OpAdd
    0007 OpStoreLocal 0
    0010 OpPop
    0011 OpNull
    0012 OpReturn
    ");
}

#[test]
fn while_break_and_continue_jump_to_loop_edges() {
    let module = compile_source(
        "let a = 0;
         while (a < 3) { a++; if a == 1 { continue; } break; }
         a;",
    );
    let code = decoded(&module, 0);

    // `let a = 0;` occupies CONST, STORE, POP.
    let loop_start = 7;
    assert_eq!(code[3].offset, loop_start);
    assert_eq!(code[3].op, OpCode::OpLoadLocal);

    let exit = code
        .iter()
        .find(|d| d.op == OpCode::OpJumpIfFalse)
        .expect("loop exit");
    let loop_end = usize::from(exit.operand.expect("operand"));

    let back_edge = code
        .iter()
        .rev()
        .find(|d| d.op == OpCode::OpJump)
        .expect("back edge");
    assert_eq!(back_edge.next, loop_end);

    // continue, break, back edge
    assert_eq!(
        operands_of(&code, OpCode::OpJump),
        vec![loop_start, loop_end, loop_start]
    );
    assert!(code.iter().all(|d| !d.op.is_loop_sentinel()));
}

#[test]
fn for_continue_jumps_to_increment() {
    let module = compile_source("for x in [1, 2] { continue; }");
    let code = decoded(&module, 0);

    let jumps: Vec<&Decoded> = code.iter().filter(|d| d.op == OpCode::OpJump).collect();
    assert_eq!(jumps.len(), 2);

    let continue_jump = jumps[0];
    assert_eq!(
        usize::from(continue_jump.operand.expect("operand")),
        continue_jump.next
    );
    let after_continue = code
        .iter()
        .find(|d| d.offset == continue_jump.next)
        .expect("increment");
    assert_eq!(after_continue.op, OpCode::OpLoadLocal);
}

#[test]
fn nested_loops_patch_their_own_sentinels() {
    let module = compile_source(
        "let i = 0;
         while i < 2 {
             i++;
             while true { break; }
             continue;
         }",
    );
    let code = decoded(&module, 0);
    assert!(code.iter().all(|d| !d.op.is_loop_sentinel()));

    let exits = operands_of(&code, OpCode::OpJumpIfFalse);
    let (outer_end, inner_end) = (exits[0], exits[1]);
    let jumps = operands_of(&code, OpCode::OpJump);
    // inner break, inner back edge, outer continue, outer back edge
    assert_eq!(jumps.len(), 4);
    assert_eq!(jumps[0], inner_end);
    assert_eq!(jumps[2], 7);
    assert_eq!(jumps[3], 7);
    assert!(outer_end > inner_end);
}

#[test]
fn accumulator_wires_parameter_cell_into_closure() {
    let module = compile_source("fn make() { let n = 0; return fn() { n = n + 1; return n; }; }");
    assert_eq!(module.functions.len(), 3);
    assert_eq!(module.functions[1].name, "make");
    assert_eq!(module.functions[2].name, "<anonymous>");
    assert_eq!(module.functions[2].num_captures, 1);

    insta::assert_snapshot!(disassemble(&module.functions[1].instructions), @r"
    0000 OpConstant 0
    0003 OpStoreLocal 0
    0006 OpPop
    0007 OpNewFunc 2
    0010 OpCaptureLocal 0
    0013 OpReturn
    0014 OpNull
    0015 OpReturn
    ");
    insta::assert_snapshot!(disassemble(&module.functions[2].instructions), @r"
    0000 OpLoadCapture 0
    0003 OpConstant 1
    0006 OpAdd
    0007 OpStoreCapture 0
    0010 OpPop
    0011 OpLoadCapture 0
    0014 OpReturn
    0015 OpNull
    0016 OpReturn
    ");
}

#[test]
fn middle_function_forwards_captures_it_never_reads() {
    let module = compile_source(
        "fn outer() { let x = 1; return fn() { return fn() { return x; }; }; }",
    );
    let middle = decoded(&module, 2);
    assert_eq!(middle[0].op, OpCode::OpNewFunc);
    assert_eq!(middle[1].op, OpCode::OpCaptureCapture);
    assert_eq!(middle[1].operand, Some(0));

    let outer = decoded(&module, 1);
    let new_func = outer
        .iter()
        .position(|d| d.op == OpCode::OpNewFunc)
        .expect("closure");
    assert_eq!(outer[new_func + 1].op, OpCode::OpCaptureLocal);
}

#[test]
fn short_circuit_operators_leave_booleans() {
    let module = compile_source("let a = true && false;");
    let ops: Vec<OpCode> = decoded(&module, 0).iter().map(|d| d.op).collect();
    assert_eq!(
        ops,
        vec![
            OpCode::OpTrue,
            OpCode::OpJumpIfFalse,
            OpCode::OpFalse,
            OpCode::OpJumpIfFalse,
            OpCode::OpTrue,
            OpCode::OpJump,
            OpCode::OpFalse,
            OpCode::OpStoreLocal,
            OpCode::OpPop,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
}

#[test]
fn struct_literal_binds_this_before_fields() {
    let module = compile_source("let o = { v: 1, get: fn() { return this.v; } };");
    assert_eq!(module.structs.len(), 1);
    assert_eq!(module.structs[0].keys, vec!["v", "get"]);

    let ops: Vec<OpCode> = decoded(&module, 0).iter().map(|d| d.op).collect();
    assert_eq!(
        &ops[..7],
        &[
            OpCode::OpNewObject,
            OpCode::OpDup,
            OpCode::OpStoreLocal,
            OpCode::OpPop,
            OpCode::OpConstant,
            OpCode::OpNewFunc,
            OpCode::OpCaptureLocal,
        ]
    );
    assert!(ops.contains(&OpCode::OpInitObject));
}

#[test]
fn postfix_on_index_keeps_old_value() {
    let module = compile_source("let xs = [1]; xs[0]++;");
    let ops: Vec<OpCode> = decoded(&module, 0).iter().map(|d| d.op).collect();
    let start = ops
        .iter()
        .position(|op| *op == OpCode::OpDup2)
        .expect("dup2");
    assert_eq!(
        &ops[start..start + 7],
        &[
            OpCode::OpDup2,
            OpCode::OpIndex,
            OpCode::OpDup,
            OpCode::OpRot4,
            OpCode::OpConstant,
            OpCode::OpAdd,
            OpCode::OpSetIndex,
        ]
    );
}

#[test]
fn native_calls_load_from_the_native_table() {
    let module = compile_source("print(1);");
    let code = decoded(&module, 0);
    assert_eq!(code[0].op, OpCode::OpLoadNative);
    assert_eq!(code[2].op, OpCode::OpCall);
    assert_eq!(code[2].operand, Some(1));
}

#[test]
fn line_table_tracks_statements() {
    let module = compile_source("let a = 1;\n\nlet b = 2;");
    let root = &module.functions[0];
    assert_eq!(root.line_at(0), Some(1));
    let second = decode(&root.instructions)
        .filter_map(Result::ok)
        .filter(|d| d.op == OpCode::OpConstant)
        .nth(1)
        .expect("second constant");
    assert_eq!(root.line_at(second.offset), Some(3));
}

#[test]
fn unresolved_program_is_rejected() {
    let program = crate::syntax::parse("x;").expect("parses");
    let error = compile(&program).expect_err("unresolved identifier");
    assert!(matches!(error, CompileError::UnresolvedIdentifier { ref name, .. } if name == "x"));
}
