//! End-to-end composition behavior: merge, subclassing and extend

mod common;

use assert_matches::assert_matches;
use common::{abs1, abs2, init_test_tracing, with_field};
use composed_model::{
    compose, compose_protocols, ClassBuilder, ComposeError, ObjectError, ProtocolBuilder, Value,
};

fn another_base() -> composed_model::Class {
    ClassBuilder::new("AnotherBase")
        .arity(1)
        .constructor(|this, args| this.set("marker", args.first().cloned().unwrap_or_default()))
        .method("fromBase", |this, _| this.get("marker"))
        .build()
        .unwrap()
}

#[test]
fn concrete_class_must_supply_abstract_members() {
    init_test_tracing();
    let template = compose!(abs1(), abs2()).unwrap();

    let err = ClassBuilder::new("Test1")
        .extends(template.as_class())
        .build()
        .unwrap_err();
    assert_matches!(
        err,
        ComposeError::MissingRequirements { class, missing }
            if class == "Test1" && missing == vec!["bar", "foo"]
    );

    let err = ClassBuilder::new("Test2")
        .extends(template.as_class())
        .field("bar", Value::Undefined)
        .build()
        .unwrap_err();
    assert_matches!(err, ComposeError::MissingRequirements { missing, .. } if missing == vec!["foo"]);

    let err = ClassBuilder::new("Test3")
        .extends(template.as_class())
        .field("foo", Value::Undefined)
        .build()
        .unwrap_err();
    assert_matches!(err, ComposeError::MissingRequirements { missing, .. } if missing == vec!["bar"]);

    assert!(template.as_class().is_abstract());
}

#[test]
fn abstract_intermediate_class_is_allowed() {
    let template = compose!(abs1()).unwrap();
    let partial = ClassBuilder::new("Partial")
        .extends(template.as_class())
        .abstract_class()
        .build()
        .unwrap();
    assert!(partial.is_abstract());

    let done = ClassBuilder::new("Done")
        .extends(&partial)
        .field("foo", 1)
        .build()
        .unwrap();
    assert!(!done.is_abstract());
}

#[test]
fn works_at_runtime() {
    init_test_tracing();
    let (p1, p2) = (abs1(), abs2());
    let template = compose!(p1, p2).unwrap();
    let test = ClassBuilder::new("Test")
        .extends(template.as_class())
        .arity(1)
        .field("foo", "implementedFoo")
        .field("bar", "implementedBar")
        .super_args(|_| Vec::new())
        .constructor(|this, args| this.set("marker", args[0].clone()))
        .build()
        .unwrap();

    let mut t = test.construct(&[Value::from("my marker")]).unwrap();
    assert_eq!(t.get("marker").unwrap(), Value::from("my marker"));
    assert_eq!(t.get("isAbs1").unwrap(), Value::Bool(true));
    assert_eq!(t.get("isAbs2").unwrap(), Value::Bool(true));
    assert_eq!(t.call("fnFromAbs1", &[]).unwrap(), Value::from("implementedFoo"));
    assert_eq!(t.call("fnFromAbs2", &[]).unwrap(), Value::from("implementedBar"));

    assert_eq!(t.get("getterFromAbs1").unwrap(), t.get("foo").unwrap());
    t.set("setterFromAbs1", "reassign!").unwrap();
    assert_eq!(t.get("getterFromAbs1").unwrap(), Value::from("reassign!"));

    assert!(p1.is_implemented_in(&t));
    assert!(p2.is_implemented_in(&t));
    assert!(template.as_class().is_instance(&t));
    assert!(test.is_instance(&t));
}

#[test]
fn extends_a_base_class() {
    init_test_tracing();
    let base = another_base();
    let (p1, p2) = (abs1(), abs2());
    let extended = compose!(p1, p2).unwrap().extend(&base);
    let test = ClassBuilder::new("Test")
        .extends(extended.as_class())
        .arity(1)
        .field("foo", "implementedFoo")
        .field("bar", "implementedBar")
        .build()
        .unwrap();

    let mut t = test.construct(&[Value::from("my marker")]).unwrap();
    assert_eq!(t.get("marker").unwrap(), Value::from("my marker"));
    assert_eq!(t.call("fromBase", &[]).unwrap(), Value::from("my marker"));
    assert!(base.is_instance(&t));

    assert_eq!(t.get("isAbs1").unwrap(), Value::Bool(true));
    assert_eq!(t.get("isAbs2").unwrap(), Value::Bool(true));
    assert_eq!(t.call("fnFromAbs1", &[]).unwrap(), Value::from("implementedFoo"));
    assert_eq!(t.call("fnFromAbs2", &[]).unwrap(), Value::from("implementedBar"));

    assert_eq!(t.get("getterFromAbs1").unwrap(), t.get("foo").unwrap());
    t.set("setterFromAbs1", "reassign!").unwrap();
    assert_eq!(t.get("getterFromAbs1").unwrap(), Value::from("reassign!"));

    assert!(p1.is_implemented_in(&t));
    assert!(p2.is_implemented_in(&t));
}

#[test]
fn extended_template_forwards_arguments_and_checks_arity() {
    let base = ClassBuilder::new("Pair")
        .arity(2)
        .constructor(|this, args| {
            this.set("left", args[0].clone())?;
            this.set("right", args[1].clone())
        })
        .build()
        .unwrap();
    let p = with_field("P", "tag", "p");
    let extended = compose!(p).unwrap().extend(&base);

    let inst = extended
        .construct(&[Value::from(1), Value::from(2)])
        .unwrap();
    assert_eq!(inst.get("left").unwrap(), Value::from(1));
    assert_eq!(inst.get("right").unwrap(), Value::from(2));
    assert_eq!(inst.get("tag").unwrap(), Value::from("p"));
    assert!(base.is_instance(&inst));
    assert!(p.is_implemented_in(&inst));

    assert_matches!(
        extended.construct(&[Value::from(1)]),
        Err(ObjectError::MissingArguments {
            expected: 2,
            actual: 1,
            ..
        })
    );
}

#[test]
fn protocol_defaults_apply_after_base_constructor() {
    let base = ClassBuilder::new("Base")
        .constructor(|this, _| this.set("g", "from base"))
        .build()
        .unwrap();
    let p = with_field("P", "g", "from protocol");
    let inst = compose!(p).unwrap().extend(&base).construct(&[]).unwrap();
    assert_eq!(inst.get("g").unwrap(), Value::from("from protocol"));
    assert!(p.is_implemented_in(&inst));
}

#[test]
fn extend_leaves_base_and_template_untouched() {
    let base = another_base();
    let p = with_field("P", "tag", true);
    let template = compose!(p).unwrap();
    let extended = template.extend(&base);

    let plain = base.construct(&[Value::from("m")]).unwrap();
    assert!(!plain.has("tag"));
    assert!(!p.is_implemented_in(&plain));

    let composed = template.construct().unwrap();
    assert!(!base.is_instance(&composed));
    assert!(!composed.has("marker"));

    let both = extended.construct(&[Value::from("m")]).unwrap();
    assert!(base.is_instance(&both));
    assert!(extended.as_class().is_instance(&both));
    assert!(!template.as_class().is_instance(&both));
}

#[test]
fn base_requirements_count_as_supplied() {
    let base = another_base();
    let needs_marker = ProtocolBuilder::new("NeedsMarker").requires("fromBase").build();
    let extended = compose!(needs_marker).unwrap().extend(&base);
    assert!(extended.requirements().is_empty());
    assert!(ClassBuilder::new("Concrete")
        .extends(extended.as_class())
        .arity(1)
        .build()
        .is_ok());
}

#[test]
fn initializer_failure_aborts_construction() {
    let ok = with_field("Ok", "x", 1);
    let broken = ProtocolBuilder::new("Broken")
        .initializer(|_| Err(ObjectError::custom("initializer refused")))
        .build();
    let template = compose!(ok, broken).unwrap();
    let err = template.construct().unwrap_err();
    assert_eq!(err.to_string(), "initializer refused");

    let extended = template.extend(&another_base());
    assert_matches!(
        extended.construct(&[Value::from("m")]),
        Err(ObjectError::Custom { .. })
    );
}

#[test]
fn single_protocol_composition_matches_the_protocol() {
    let p = ProtocolBuilder::new("Solo")
        .field("a", 1)
        .getter("double", |this| Ok(Value::Number(this.get("a")?.to_number() * 2.0)))
        .build();
    let template = compose_protocols(&[p.clone()]).unwrap();
    let composed = template.construct().unwrap();
    let bare = p.instantiate().unwrap();
    assert_eq!(composed.keys(), bare.keys());
    assert_eq!(composed.get("double").unwrap(), Value::from(2));
}

#[test]
fn methods_see_later_mutation() {
    let p = ProtocolBuilder::new("Reader")
        .field("f", "initial")
        .method("read", |this, _| this.get("f"))
        .build();
    let mut inst = compose!(p).unwrap().construct().unwrap();
    assert_eq!(inst.call("read", &[]).unwrap(), Value::from("initial"));
    inst.set("f", "changed").unwrap();
    assert_eq!(inst.call("read", &[]).unwrap(), Value::from("changed"));
}

#[test]
fn instances_do_not_share_storage() {
    let p = with_field("P", "count", 0);
    let template = compose!(p).unwrap();
    let mut a = template.construct().unwrap();
    let b = template.construct().unwrap();
    a.set("count", 5).unwrap();
    assert_eq!(b.get("count").unwrap(), Value::from(0));
}

#[test]
fn marker_is_not_enumerable() {
    let p = with_field("P", "visible", 1);
    let inst = compose!(p).unwrap().construct().unwrap();
    assert_eq!(inst.keys(), vec!["visible"]);
}

#[test]
fn subclass_of_extended_template_keeps_base_arity() {
    let list = ClassBuilder::new("ListModel")
        .arity(1)
        .constructor(|this, args| this.set("endpoint", args[0].clone()))
        .build()
        .unwrap();
    let p = with_field("P", "tag", true);
    let extended = compose!(p).unwrap().extend(&list);
    let sub = ClassBuilder::new("Sub")
        .extends(extended.as_class())
        .build()
        .unwrap();

    assert_matches!(
        sub.construct(&[]),
        Err(ObjectError::MissingArguments { class, expected: 1, actual: 0 }) if class == "ListModel"
    );

    let inst = sub.construct(&[Value::from("/items")]).unwrap();
    assert_eq!(inst.get("endpoint").unwrap(), Value::from("/items"));
    assert!(list.is_instance(&inst));
    assert!(p.is_implemented_in(&inst));
}

#[test]
fn lenient_subclass_pads_base_arguments() {
    let config = composed_model::EngineConfig {
        strict_arity: false,
        ..composed_model::EngineConfig::default()
    };
    let list = ClassBuilder::new("ListModel")
        .arity(1)
        .config(&config)
        .constructor(|this, args| this.set("endpoint", args[0].clone()))
        .build()
        .unwrap();
    let p = with_field("P", "tag", true);
    let extended = composed_model::compose_protocols_with(&config, &[p])
        .unwrap()
        .extend(&list);
    let sub = ClassBuilder::new("Sub")
        .extends(extended.as_class())
        .config(&config)
        .build()
        .unwrap();

    let inst = sub.construct(&[]).unwrap();
    assert!(inst.get("endpoint").unwrap().is_undefined());
    assert_eq!(inst.get("tag").unwrap(), Value::Bool(true));
}
