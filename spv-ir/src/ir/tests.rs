//! Unit tests for the IR module

use super::*;
use pretty_assertions::assert_eq;
use spv_common::{SpvError, SpvId, StorageClass, ValidationConfig};

/// `F: () -> i32` plus a void caller with one block
struct Fixture {
    module: Module,
    void_ty: SpvId,
    i32_ty: SpvId,
    callee_ty: SpvId,
    callee: SpvId,
    caller: SpvId,
    block: SpvId,
}

fn fixture() -> Fixture {
    let mut module = Module::new("test".to_string());
    let void_ty = module.type_void().unwrap();
    let i32_ty = module.type_int(32, true).unwrap();
    let callee_ty = module.type_function(i32_ty, vec![]).unwrap();
    let callee = module.add_function(callee_ty).unwrap();
    let caller_ty = module.type_function(void_ty, vec![]).unwrap();
    let caller = module.add_function(caller_ty).unwrap();
    let block = module.add_block(caller).unwrap();
    Fixture { module, void_ty, i32_ty, callee_ty, callee, caller, block }
}

fn invalid_message(error: SpvError) -> String {
    match error {
        SpvError::InvalidModule { message, .. } => message,
        other => panic!("expected InvalidModule, got {other:?}"),
    }
}

fn unreachable_in(module: &mut Module, block: SpvId) -> Instruction {
    Instruction::anonymous(module, 1, Unreachable, block).unwrap()
}

#[test]
fn test_call_to_function_without_arguments() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let call = Instruction::function_call(&mut f.module, id, f.callee, vec![], f.block).unwrap();

    assert_eq!(call.id(), Some(id));
    assert_eq!(call.ty(), Some(f.i32_ty));
    assert_eq!(call.parent(), Some(f.block));
    assert_eq!(call.word_count(), 4);
    assert!(call.operands().is_empty());
    assert!(call.operand_types(&f.module).unwrap().is_empty());
    assert_eq!(call.as_function_call().unwrap().function_id(), f.callee);
    assert_eq!(f.module.result_type_of(id), Some(f.i32_ty));
    assert_eq!(call.to_string(), format!("%{id} = OpFunctionCall %{} %{}", f.i32_ty, f.callee));
}

#[test]
fn test_call_resolves_callee_on_demand() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let call = Instruction::function_call(&mut f.module, id, f.callee, vec![], f.block).unwrap();

    let callee = call.as_function_call().unwrap().function(&f.module).unwrap();
    assert_eq!(callee.id(), f.callee);
    assert_eq!(callee.function_type(), f.callee_ty);
}

#[test]
fn test_call_result_type_fixed_at_construction() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let call = Instruction::function_call(&mut f.module, id, f.callee, vec![], f.block).unwrap();

    let i64_ty = f.module.type_int(64, true).unwrap();
    let new_signature = f.module.type_function(i64_ty, vec![]).unwrap();
    f.module.set_function_type(f.callee, new_signature).unwrap();

    assert_eq!(f.module.get_function(f.callee).unwrap().return_type(), i64_ty);
    assert_eq!(call.ty(), Some(f.i32_ty));
    assert_eq!(f.module.result_type_of(id), Some(f.i32_ty));

    // The stale call no longer matches its callee and must be rebuilt
    let message = invalid_message(call.validate(&f.module).unwrap_err());
    assert!(message.contains("does not match return type"), "{message}");
}

#[test]
fn test_function_operand_contributes_its_signature() {
    let mut f = fixture();
    let c42 = f.module.add_constant(f.i32_ty, 42).unwrap();
    let taker_ty = f.module.type_function(f.void_ty, vec![f.callee_ty, f.i32_ty]).unwrap();
    let taker = f.module.add_function(taker_ty).unwrap();

    let id = f.module.allocate_id();
    let call = Instruction::function_call(&mut f.module, id, taker, vec![f.callee, c42], f.block).unwrap();

    let operands = call.operands();
    let types = call.operand_types(&f.module).unwrap();
    assert_eq!(operands, vec![f.callee, c42]);
    assert_eq!(types.len(), operands.len());
    assert_eq!(types, vec![Some(f.callee_ty), Some(f.i32_ty)]);

    // A function's own result type is its return type, not its signature
    assert_eq!(f.module.result_type_of(f.callee), Some(f.i32_ty));
    assert_eq!(call.ty(), Some(f.void_ty));
}

#[test]
fn test_label_operands_have_no_type() {
    let mut f = fixture();
    let target = f.module.add_block(f.caller).unwrap();
    let branch = Instruction::anonymous(&mut f.module, 2, Branch { target }, f.block).unwrap();

    assert_eq!(branch.operands(), vec![target]);
    assert_eq!(branch.operand_types(&f.module).unwrap(), vec![None]);
}

#[test]
fn test_operand_types_reject_unknown_ids() {
    let mut f = fixture();
    let call = {
        let id = f.module.allocate_id();
        Instruction::function_call(&mut f.module, id, f.callee, vec![], f.block).unwrap()
    };
    assert!(call.operand_types(&f.module).is_ok());
    assert_eq!(resolve_operand_type(&f.module, 999), Err(SpvError::UnknownId(999)));
}

#[test]
fn test_call_argument_count_mismatch() {
    let mut f = fixture();
    let sig = f.module.type_function(f.i32_ty, vec![f.i32_ty]).unwrap();
    let unary = f.module.add_function(sig).unwrap();

    let id = f.module.allocate_id();
    let error = Instruction::function_call(&mut f.module, id, unary, vec![], f.block).unwrap_err();
    let message = invalid_message(error);
    assert!(message.contains("expects 1 argument(s), got 0"), "{message}");
    assert!(!f.module.is_registered(id));
}

#[test]
fn test_call_argument_type_mismatch() {
    let mut f = fixture();
    let sig = f.module.type_function(f.i32_ty, vec![f.i32_ty]).unwrap();
    let unary = f.module.add_function(sig).unwrap();
    let yes = f.module.add_bool_constant(true).unwrap();

    let id = f.module.allocate_id();
    let error = Instruction::function_call(&mut f.module, id, unary, vec![yes], f.block).unwrap_err();
    let message = invalid_message(error);
    assert!(message.starts_with("argument 0"), "{message}");
}

#[test]
fn test_call_to_non_function() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let error = Instruction::function_call(&mut f.module, id, f.i32_ty, vec![], f.block).unwrap_err();
    assert!(invalid_message(error).contains("is not a function"));
}

#[test]
fn test_invalid_module_error_carries_location() {
    let mut f = fixture();
    let error = Instruction::anonymous(&mut f.module, 0, Return, f.block).unwrap_err();
    match error {
        SpvError::InvalidModule { op_code, id, block, function, .. } => {
            assert_eq!(op_code, "OpReturn");
            assert_eq!(id, None);
            assert_eq!(block, Some(f.block));
            assert_eq!(function, Some(f.caller));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_set_parent_is_idempotent() {
    let mut f = fixture();
    let mut instr = Instruction::detached(&mut f.module, 1, Unreachable, None, None).unwrap();
    assert_eq!(instr.parent(), None);

    instr.set_parent(f.block);
    instr.set_parent(f.block);
    assert_eq!(instr.parent(), Some(f.block));

    let mut bound = unreachable_in(&mut f.module, f.block);
    bound.set_parent(f.block);
    assert_eq!(bound.parent(), Some(f.block));
}

#[test]
#[should_panic(expected = "BB cannot change parent")]
fn test_set_parent_rejects_a_different_block() {
    let mut f = fixture();
    let other = f.module.add_block(f.caller).unwrap();
    let mut instr = unreachable_in(&mut f.module, f.block);
    instr.set_parent(other);
}

#[test]
#[should_panic(expected = "Invalid BB")]
fn test_set_parent_rejects_null_block() {
    let mut f = fixture();
    let mut instr = Instruction::detached(&mut f.module, 1, Unreachable, None, None).unwrap();
    instr.set_parent(0);
}

#[test]
#[should_panic(expected = "Invalid BB")]
fn test_construction_requires_a_label() {
    let mut f = fixture();
    let not_a_block = f.i32_ty;
    Instruction::anonymous(&mut f.module, 1, Unreachable, not_a_block).unwrap();
}

#[test]
fn test_set_scope_binds_label() {
    let mut f = fixture();
    let mut instr = Instruction::detached(&mut f.module, 1, Unreachable, None, None).unwrap();
    instr.set_scope(&f.module, f.block);
    assert_eq!(instr.parent(), Some(f.block));
}

#[test]
#[should_panic(expected = "Invalid scope")]
fn test_set_scope_rejects_function() {
    let mut f = fixture();
    let mut instr = Instruction::detached(&mut f.module, 1, Unreachable, None, None).unwrap();
    instr.set_scope(&f.module, f.caller);
}

#[test]
#[should_panic(expected = "Invalid scope")]
fn test_set_scope_rejects_constant() {
    let mut f = fixture();
    let c = f.module.add_constant(f.i32_ty, 7).unwrap();
    let mut instr = Instruction::detached(&mut f.module, 1, Unreachable, None, None).unwrap();
    instr.set_scope(&f.module, c);
}

#[test]
fn test_value_shapes_leave_absent_fields_empty() {
    let both = Value::new(4, OpCode::Load, 2, 9);
    let id_only = Value::with_id(2, OpCode::Label, 9);
    let neither = Value::anonymous(1, OpCode::Return);
    let type_only = Value::with_type(3, OpCode::Undef, 2);

    assert_eq!((both.ty(), both.id()), (Some(2), Some(9)));
    assert_eq!((id_only.ty(), id_only.id()), (None, Some(9)));
    assert_eq!((neither.ty(), neither.id()), (None, None));
    assert_eq!((type_only.ty(), type_only.id()), (Some(2), None));
}

#[test]
fn test_every_construction_shape_is_validated() {
    let mut f = fixture();
    let ptr_ty = f.module.type_pointer(StorageClass::Function, f.i32_ty).unwrap();
    let c42 = f.module.add_constant(f.i32_ty, 42).unwrap();
    let var = f.module.allocate_id();
    let variable = Variable { storage_class: StorageClass::Function, initializer: None };
    let variable = Instruction::new(&mut f.module, 4, variable, ptr_ty, var, f.block).unwrap();
    f.module.append_instruction(f.block, variable).unwrap();

    // (type, id)
    let id = f.module.allocate_id();
    let load = Instruction::new(&mut f.module, 4, Load { pointer: var }, f.i32_ty, id, f.block).unwrap();
    assert_eq!((load.ty(), load.id()), (Some(f.i32_ty), Some(id)));

    // (id only)
    let id = f.module.allocate_id();
    let error = Instruction::with_id(&mut f.module, 3, Load { pointer: var }, id, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "missing result type");
    assert!(!f.module.is_registered(id));

    // (neither)
    let store = Instruction::anonymous(&mut f.module, 3, Store { pointer: var, object: c42 }, f.block).unwrap();
    assert_eq!((store.ty(), store.id()), (None, None));

    // (type only)
    let error = Instruction::with_type(&mut f.module, 3, Load { pointer: var }, f.i32_ty, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "missing result id");
}

#[test]
fn test_zero_word_count_is_rejected() {
    let mut f = fixture();
    let error = Instruction::anonymous(&mut f.module, 0, Return, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "word count 0 is below the minimum of 1");

    let id = f.module.allocate_id();
    let error = Instruction::new(&mut f.module, 0, Undef, f.i32_ty, id, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "word count 0 is below the minimum of 3");
}

#[test]
fn test_word_count_must_match_encoding() {
    let mut f = fixture();
    let target = f.module.add_block(f.caller).unwrap();
    let error = Instruction::anonymous(&mut f.module, 3, Branch { target }, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "word count 3 does not match encoded size 2");
}

#[test]
fn test_duplicate_result_id() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    Instruction::new(&mut f.module, 3, Undef, f.i32_ty, id, f.block).unwrap();
    let error = Instruction::new(&mut f.module, 3, Undef, f.i32_ty, id, f.block).unwrap_err();
    assert_eq!(error, SpvError::DuplicateId(id));
}

#[test]
fn test_unregistered_result_type() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let error = Instruction::new(&mut f.module, 3, Undef, 500, id, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "%500 is not a registered type");
}

#[test]
fn test_block_binds_detached_instruction() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let undef = Instruction::detached(&mut f.module, 3, Undef, Some(f.i32_ty), Some(id)).unwrap();
    assert_eq!(f.module.value_info(id).unwrap().block, None);

    f.module.append_instruction(f.block, undef).unwrap();

    let info = f.module.value_info(id).unwrap();
    assert_eq!(info.block, Some(f.block));
    assert_eq!(info.function, Some(f.caller));
    let block = f.module.get_block(f.block).unwrap();
    assert_eq!(block.instructions()[0].parent(), Some(f.block));
}

#[test]
fn test_basic_block() {
    let mut f = fixture();
    let mut block = BasicBlock::new(f.block);
    assert!(block.is_empty());
    assert!(!block.has_terminator());
    assert_eq!(block.value().op_code(), OpCode::Label);
    assert_eq!(block.value().id(), Some(f.block));

    let id = f.module.allocate_id();
    block.add_instruction(Instruction::new(&mut f.module, 3, Undef, f.i32_ty, id, f.block).unwrap());
    assert!(!block.is_empty());
    assert!(!block.has_terminator());

    block.add_instruction(unreachable_in(&mut f.module, f.block));
    assert!(block.has_terminator());
}

#[test]
fn test_return_checks_function_return_type() {
    let mut f = fixture();
    let callee_block = f.module.add_block(f.callee).unwrap();
    let error = Instruction::anonymous(&mut f.module, 1, Return, callee_block).unwrap_err();
    assert!(invalid_message(error).contains("must return a value"));

    let c = f.module.add_constant(f.i32_ty, 3).unwrap();
    let ret = Instruction::anonymous(&mut f.module, 2, ReturnValue { value: c }, callee_block).unwrap();
    assert_eq!(ret.operand_types(&f.module).unwrap(), vec![Some(f.i32_ty)]);
}

#[test]
fn test_variable_storage_class_inside_function() {
    let mut f = fixture();
    let private_ptr = f.module.type_pointer(StorageClass::Private, f.i32_ty).unwrap();
    let id = f.module.allocate_id();
    let variable = Variable { storage_class: StorageClass::Private, initializer: None };
    let error = Instruction::new(&mut f.module, 4, variable, private_ptr, id, f.block).unwrap_err();
    assert!(invalid_message(error).contains("Function storage class"));
}

#[test]
fn test_variable_with_initializer() {
    let mut f = fixture();
    let ptr = f.module.type_pointer(StorageClass::Function, f.i32_ty).unwrap();
    let c = f.module.add_constant(f.i32_ty, 1).unwrap();
    let id = f.module.allocate_id();
    let variable = Variable { storage_class: StorageClass::Function, initializer: Some(c) };
    let instr = Instruction::new(&mut f.module, 5, variable, ptr, id, f.block).unwrap();
    assert_eq!(instr.operands(), vec![c]);
    assert_eq!(instr.to_string(), format!("%{id} = OpVariable %{ptr} Function %{c}"));
}

#[test]
fn test_module_types_are_deduplicated() {
    let mut module = Module::new("types".to_string());
    let a = module.type_int(32, true).unwrap();
    let b = module.type_int(32, true).unwrap();
    let c = module.type_int(32, false).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(module.types().len(), 2);
    assert_eq!(module.type_void().unwrap(), module.type_void().unwrap());

    assert_eq!(module.type_pointer(StorageClass::Function, 77), Err(SpvError::UnknownId(77)));
    assert!(module.type_int(0, true).is_err());
}

#[test]
fn test_module_constants() {
    let mut module = Module::new("constants".to_string());
    let i64_ty = module.type_int(64, false).unwrap();
    let wide = module.add_constant(i64_ty, 0x1_0000_0002).unwrap();
    let flag = module.add_bool_constant(false).unwrap();

    let constants = module.constants();
    assert_eq!(constants[0].id, wide);
    assert_eq!(constants[0].value, ConstantValue::Literal(vec![2, 1]));
    assert_eq!(constants[0].word_count(), 5);
    assert_eq!(constants[1].id, flag);
    assert_eq!(constants[1].op_code(), OpCode::ConstantFalse);

    let void_ty = module.type_void().unwrap();
    assert!(module.add_constant(void_ty, 1).is_err());
}

#[test]
fn test_add_function_requires_function_type() {
    let mut module = Module::new("functions".to_string());
    let i32_ty = module.type_int(32, true).unwrap();
    assert!(module.add_function(i32_ty).unwrap_err().is_invalid_module());
    assert_eq!(module.add_function(404), Err(SpvError::UnknownId(404)));

    let sig = module.type_function(i32_ty, vec![i32_ty, i32_ty]).unwrap();
    let function = module.add_function(sig).unwrap();
    let function = module.get_function(function).unwrap();
    assert_eq!(function.parameters().len(), 2);
    assert_eq!(function.return_type(), i32_ty);
    assert_eq!(module.result_type_of(function.parameters()[1].id), Some(i32_ty));
}

#[test]
fn test_ir_builder() {
    let mut builder = ModuleBuilder::new("demo");
    let i32_ty = builder.module_mut().type_int(32, true).unwrap();

    let add = builder.create_function(i32_ty, vec![i32_ty, i32_ty]).unwrap();
    builder.create_block().unwrap();
    let a = builder.parameter(0).unwrap();
    let b = builder.parameter(1).unwrap();
    let sum = builder.build_binary(BinaryOp::IAdd, i32_ty, a, b).unwrap();
    builder.build_return_value(sum).unwrap();
    assert!(builder.current_block_has_terminator());

    let void_ty = builder.module_mut().type_void().unwrap();
    builder.create_function(void_ty, vec![]).unwrap();
    let entry = builder.create_block().unwrap();
    let one = builder.module_mut().add_constant(i32_ty, 1).unwrap();
    let call = builder.build_call(add, vec![one, one]).unwrap();
    builder.build_return().unwrap();

    let module = builder.finish();
    module.check().unwrap();
    assert_eq!(module.result_type_of(call), Some(i32_ty));

    let block = module.get_block(entry).unwrap();
    assert_eq!(block.instructions().len(), 2);
    assert!(block.instructions().iter().all(|i| i.parent() == Some(entry)));
    assert_eq!(block.instructions()[0].word_count(), 6);
}

#[test]
fn test_builder_requires_block() {
    let mut builder = ModuleBuilder::new("demo");
    assert!(builder.create_block().is_err());
    assert!(builder.build_return().is_err());
}

#[test]
fn test_builder_control_flow() {
    let mut builder = ModuleBuilder::new("branches");
    let void_ty = builder.module_mut().type_void().unwrap();
    let i32_ty = builder.module_mut().type_int(32, true).unwrap();
    let bool_ty = builder.module_mut().type_bool().unwrap();
    builder.create_function(void_ty, vec![i32_ty, i32_ty]).unwrap();

    let entry = builder.create_block().unwrap();
    let then_label = builder.create_block().unwrap();
    let else_label = builder.create_block().unwrap();

    builder.position_at(entry).unwrap();
    let a = builder.parameter(0).unwrap();
    let b = builder.parameter(1).unwrap();
    let less = builder.build_binary(BinaryOp::SLessThan, bool_ty, a, b).unwrap();
    assert!(builder.build_binary(BinaryOp::SLessThan, i32_ty, a, b).is_err());
    assert!(builder.build_branch(i32_ty).is_err());
    builder.build_branch_cond(less, then_label, else_label).unwrap();

    builder.position_at(then_label).unwrap();
    builder.build_branch(else_label).unwrap();
    builder.position_at(else_label).unwrap();
    builder.build_unreachable().unwrap();

    let module = builder.finish();
    module.check().unwrap();
}

#[test]
fn test_builder_memory() {
    let mut builder = ModuleBuilder::new("memory");
    let void_ty = builder.module_mut().type_void().unwrap();
    let i32_ty = builder.module_mut().type_int(32, true).unwrap();
    let ptr_ty = builder.module_mut().type_pointer(StorageClass::Function, i32_ty).unwrap();
    builder.create_function(void_ty, vec![]).unwrap();
    builder.create_block().unwrap();

    let seven = builder.module_mut().add_constant(i32_ty, 7).unwrap();
    let var = builder.build_variable(ptr_ty, None).unwrap();
    builder.build_store(var, seven).unwrap();
    let loaded = builder.build_load(i32_ty, var).unwrap();
    assert!(builder.build_load(ptr_ty, var).is_err());
    let undef = builder.build_undef(i32_ty).unwrap();
    builder.build_binary(BinaryOp::IMul, i32_ty, loaded, undef).unwrap();
    builder.build_return().unwrap();

    let module = builder.finish();
    module.check().unwrap();
}

#[test]
fn test_instruction_kind_word_counts() {
    let call = InstructionKind::from(FunctionCall::new(3, vec![4, 5]));
    assert_eq!(call.op_code(), OpCode::FunctionCall);
    assert_eq!(call.word_count(true, true), 6);

    let store = InstructionKind::from(Store { pointer: 1, object: 2 });
    assert_eq!(store.word_count(false, false), 3);

    let variable = InstructionKind::from(Variable { storage_class: StorageClass::Function, initializer: None });
    assert_eq!(variable.word_count(true, true), 4);
}

#[test]
fn test_result_never_appended_to_its_block() {
    let mut builder = ModuleBuilder::new("dangling");
    let void_ty = builder.module_mut().type_void().unwrap();
    let i32_ty = builder.module_mut().type_int(32, true).unwrap();
    let ptr_ty = builder.module_mut().type_pointer(StorageClass::Function, i32_ty).unwrap();
    builder.create_function(void_ty, vec![]).unwrap();
    let block = builder.create_block().unwrap();
    let var = builder.build_variable(ptr_ty, None).unwrap();

    let lost = builder.module_mut().allocate_id();
    drop(Instruction::new(builder.module_mut(), 3, Undef, i32_ty, lost, block).unwrap());
    builder.build_store(var, lost).unwrap();
    builder.build_return().unwrap();

    let module = builder.finish();
    match module.check().unwrap_err() {
        SpvError::InvalidModule { op_code, id, block: at, message, .. } => {
            assert_eq!(op_code, "OpUndef");
            assert_eq!(id, Some(lost));
            assert_eq!(at, Some(block));
            assert!(message.contains("no block holds it"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_detached_result_must_be_appended() {
    let mut f = fixture();
    let id = f.module.allocate_id();
    let undef = Instruction::detached(&mut f.module, 3, Undef, Some(f.i32_ty), Some(id)).unwrap();
    let ret = Instruction::anonymous(&mut f.module, 1, Return, f.block).unwrap();
    f.module.append_instruction(f.block, ret).unwrap();

    let error = f.module.check().unwrap_err();
    assert!(
        matches!(error, SpvError::InvalidModule { id: Some(found), block: None, .. } if found == id),
        "{error:?}"
    );

    // Once a block holds it the module is whole again
    let mut f = fixture();
    let id = f.module.allocate_id();
    let undef_again = Instruction::detached(&mut f.module, 3, Undef, Some(f.i32_ty), Some(id)).unwrap();
    f.module.append_instruction(f.block, undef_again).unwrap();
    let ret = Instruction::anonymous(&mut f.module, 1, Return, f.block).unwrap();
    f.module.append_instruction(f.block, ret).unwrap();
    assert_eq!(f.module.check(), Ok(()));
    assert_eq!(undef.id(), Some(id));
}

#[test]
fn test_max_result_id_is_rejected() {
    let mut f = fixture();
    let error = Instruction::new(&mut f.module, 3, Undef, f.i32_ty, SpvId::MAX, f.block).unwrap_err();
    assert_eq!(invalid_message(error), "result id leaves no representable id bound");
    assert!(!f.module.is_registered(SpvId::MAX));

    let undef = Instruction::new(&mut f.module, 3, Undef, f.i32_ty, SpvId::MAX - 1, f.block).unwrap();
    assert_eq!(undef.id(), Some(SpvId::MAX - 1));
    assert_eq!(f.module.id_bound(), SpvId::MAX);

    // The allocator is exhausted; whatever it hands out next is refused
    let next = f.module.allocate_id();
    assert!(Instruction::new(&mut f.module, 3, Undef, f.i32_ty, next, f.block).is_err());
}

#[test]
fn test_fail_fast_stops_within_one_instruction() {
    let mut f = fixture();
    let c = f.module.add_constant(f.i32_ty, 1).unwrap();
    let early = Instruction::detached(&mut f.module, 2, ReturnValue { value: c }, None, None).unwrap();
    f.module.append_instruction(f.block, early).unwrap();
    let ret = Instruction::anonymous(&mut f.module, 1, Return, f.block).unwrap();
    f.module.append_instruction(f.block, ret).unwrap();

    // Wrong return type and a terminator before the end, both on the first instruction
    let reporter = f.module.validate(&ValidationConfig::fail_fast());
    assert_eq!(reporter.error_count(), 1);
    let message = invalid_message(reporter.into_first_error().unwrap());
    assert!(message.contains("function returns"), "{message}");

    let reporter = f.module.validate(&ValidationConfig::aggregate());
    assert_eq!(reporter.error_count(), 2);
}

#[test]
fn test_function_without_blocks_warns() {
    let mut f = fixture();
    let ret = Instruction::anonymous(&mut f.module, 1, Return, f.block).unwrap();
    f.module.append_instruction(f.block, ret).unwrap();

    let reporter = f.module.validate(&ValidationConfig::aggregate());
    assert!(!reporter.has_errors());
    assert_eq!(reporter.warning_count(), 1);
    assert_eq!(reporter.summary(), "1 warning");
    assert!(f.module.check().is_ok());
}

#[test]
fn test_function_blocks() {
    let mut f = fixture();
    let second = f.module.add_block(f.caller).unwrap();
    let caller = f.module.get_function(f.caller).unwrap();
    assert_eq!(caller.entry_block().map(BasicBlock::label), Some(f.block));
    assert_eq!(caller.blocks().len(), 2);
    assert_eq!(caller.get_block(second).map(BasicBlock::label), Some(second));
    assert!(f.module.get_function(f.callee).unwrap().entry_block().is_none());
}
