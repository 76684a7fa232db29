//! Holiday expenses split three ways, simplified and settled.
//!
//! Shows each split method, how the debt table collapses under
//! simplification, and a settlement moving tokens.

use group_ledger::prelude::*;

fn main() {
    println!("╔═════════════════════════════════════════╗");
    println!("║  group-ledger: Holiday Split Example    ║");
    println!("╚═════════════════════════════════════════╝\n");

    let (ledger, token) = LedgerService::in_memory(EngineConfig::default());
    let alice = MemberId::new("alice");
    let bob = MemberId::new("bob");
    let charlie = MemberId::new("charlie");
    let everyone = [alice.clone(), bob.clone(), charlie.clone()];

    let group = ledger.create_group(&alice, "Holiday", &[bob.clone(), charlie.clone()]);

    // --- Expenses ---
    println!("━━━ Expenses ━━━\n");
    let expenses = [
        (&alice, "Hotel", 90, everyone.to_vec(), SplitMethod::Equal),
        (
            &bob,
            "Groceries",
            40,
            vec![alice.clone(), charlie.clone()],
            SplitMethod::Exact(vec![10, 30]),
        ),
        (
            &charlie,
            "Fuel",
            60,
            vec![alice.clone(), bob.clone()],
            SplitMethod::Percentage(vec![25, 75]),
        ),
    ];
    for (payer, description, amount, participants, method) in expenses {
        let kind = method.kind();
        match ledger.register_expense(group, payer, description, amount, &participants, method) {
            Ok(id) => println!(
                "{} {:<10} {:>4} paid by {} ({})",
                id, description, amount, payer, kind
            ),
            Err(e) => {
                eprintln!("{} failed: {}", description, e);
                return;
            }
        }
    }

    print_debts(&ledger, group, &alice);

    // --- Simplification ---
    println!("\n━━━ Simplification ━━━\n");
    match ledger.simplify(group, &alice) {
        Ok(report) => println!("{}", report),
        Err(e) => eprintln!("simplify failed: {}", e),
    }

    // --- Settlement ---
    println!("━━━ Settlement ━━━\n");
    token.deposit(&bob, 100);
    token.approve(&bob, ledger.operator(), 35);
    match ledger.settle(group, &bob, &alice, 35) {
        Ok(record) => println!("{} paid {} {}", record.payer(), record.payee(), record.amount()),
        Err(e) => eprintln!("settlement failed: {}", e),
    }
    print_debts(&ledger, group, &alice);
}

fn print_debts(ledger: &LedgerService, group: GroupId, caller: &MemberId) {
    println!("\nDebts:");
    match ledger.debts(group, caller) {
        Ok(debts) if debts.is_empty() => println!("  none"),
        Ok(debts) => {
            for edge in debts {
                println!("  {}", edge);
            }
        }
        Err(e) => eprintln!("  {}", e),
    }
}
