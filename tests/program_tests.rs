mod support;

use ember::runtime::RuntimeError;

use support::{eval, output_of, runtime_fault};

#[test]
fn accumulator_generator() {
    let source = "
        const accumGen = fn(n) {
            return fn(i) {
                n = n + i;
                return n;
            };
        };
        const a = accumGen(3);
        const b = accumGen(100);
        return [a(2), a(7), b(1)];
    ";
    assert_eq!(eval(source), "[5, 12, 101]");
}

#[test]
fn counter_struct_with_methods() {
    let source = "
        fn counter(start) {
            return {
                count: start,
                inc: fn() { this.count++; return this; },
                get: fn() { return this.count; }
            };
        }
        let c = counter(10);
        c.inc().inc().inc();
        return c.get();
    ";
    assert_eq!(eval(source), "13");
}

#[test]
fn closures_in_loop_share_the_loop_variable_cell() {
    let source = "
        let fs = [];
        let i = 0;
        while i < 3 {
            append(fs, fn() { return i; });
            i++;
        }
        return [fs[0](), fs[2]()];
    ";
    assert_eq!(eval(source), "[3, 3]");
}

#[test]
fn block_scoped_shadowing_reads_outer_value() {
    let source = "
        let x = 1;
        let seen = 0;
        {
            let x = x + 10;
            seen = x;
        }
        return [x, seen];
    ";
    assert_eq!(eval(source), "[1, 11]");
}

#[test]
fn mutual_recursion_through_forward_declared_local() {
    let source = "
        let odd;
        fn even(n) { if n == 0 { return true; } return odd(n - 1); }
        odd = fn(n) { if n == 0 { return false; } return even(n - 1); };
        return [even(10), odd(7), even(3)];
    ";
    assert_eq!(eval(source), "[true, true, false]");
}

#[test]
fn fibonacci_iterative_and_recursive_agree() {
    let source = "
        fn fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); }
        fn fib_loop(n) {
            let a = 0, b = 1;
            for _ in range(n) {
                let t = a + b;
                a = b;
                b = t;
            }
            return a;
        }
        return [fib(15), fib_loop(15)];
    ";
    assert_eq!(eval(source), "[610, 610]");
}

#[test]
fn value_semantics() {
    assert_eq!(eval("return 7 / 2;"), "3");
    assert_eq!(eval("return 7 / 2.0;"), "3.5");
    assert_eq!(eval("return -7 % 3;"), "-1");
    assert_eq!(eval("return \"ab\" + \"cd\";"), "\"abcd\"");
    assert_eq!(eval("return [1] + [2, 3];"), "[1, 2, 3]");
    assert_eq!(eval("return [1 == 1.0, \"a\" < \"b\", [1] == [1]];"), "[true, true, false]");
    assert_eq!(eval("let xs = [1, 2, 3]; return [xs[-1], \"hey\"[1]];"), "[3, \"e\"]");
    assert_eq!(eval("return 9223372036854775807 + 1;"), "-9223372036854775808");
    assert_eq!(eval("return [!0, !\"\", !null, ![]];"), "[true, true, true, false]");
}

#[test]
fn natives_cover_conversions() {
    assert_eq!(
        eval("return [str(12), int(\"42\"), float(2), type(1.5), type(print), len(range(2, 6))];"),
        "[\"12\", 42, 2.0, \"Float\", \"Native\", 4]"
    );
}

#[test]
fn print_formats_values() {
    let (result, output) = output_of(
        "print(\"total:\", 1 + 2);
         print([1, \"two\", null], { a: 1 });
         print();",
    );
    assert!(result.is_ok());
    assert_eq!(output, "total: 3\n[1, \"two\", null] { a: 1 }\n\n");
}

#[test]
fn runtime_errors_carry_kind_and_trace() {
    let fault = runtime_fault("let xs = [1];\nfn at(i) {\n  return xs[i];\n}\nat(4);");
    assert_eq!(fault.error, RuntimeError::IndexOutOfBounds { index: 4, len: 1 });
    assert_eq!(fault.trace[0].function, "at");
    assert_eq!(fault.trace[0].line, 3);
    assert_eq!(fault.trace[1].function, "<main>");
    assert_eq!(fault.trace[1].line, 5);

    let fault = runtime_fault("return 1 + \"a\";");
    assert_eq!(
        fault.error,
        RuntimeError::TypeMismatch("cannot add Int and String".to_string())
    );
}

#[test]
fn output_before_a_fault_is_kept() {
    let (result, output) = output_of("print(1); print(2 / 0); print(3);");
    assert_eq!(output, "1\n");
    assert_eq!(result.map_err(|fault| fault.error), Err(RuntimeError::DivideByZero));
}
