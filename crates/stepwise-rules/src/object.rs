//! Equality, hashing and cloning for boxed rules.
//!
//! Rules are stored as trait objects so hosts can register their own rule
//! types next to the built-in ones. Tasks still compare, deduplicate and
//! copy rules, so every rule trait gets an object-safe support trait that
//! forwards to the concrete type's `PartialEq`, `Hash` and `Clone`.
//! Comparing rules of two different concrete types is always `false`.

macro_rules! rule_object {
    ($rule:ident, $support:ident) => {
        /// Object-safe equality, hashing and cloning for boxed rules.
        ///
        /// Implemented automatically for every rule type that is
        /// `Clone + Eq + Hash`.
        #[doc(hidden)]
        pub trait $support {
            fn as_any(&self) -> &dyn ::std::any::Any;
            fn eq_rule(&self, other: &dyn $rule) -> bool;
            fn hash_rule(&self, state: &mut dyn ::std::hash::Hasher);
            fn clone_rule(&self) -> Box<dyn $rule>;
        }

        impl<T> $support for T
        where
            T: $rule + Clone + Eq + ::std::hash::Hash + 'static,
        {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn eq_rule(&self, other: &dyn $rule) -> bool {
                other
                    .as_any()
                    .downcast_ref::<T>()
                    .is_some_and(|other| self == other)
            }

            fn hash_rule(&self, mut state: &mut dyn ::std::hash::Hasher) {
                ::std::hash::Hash::hash(self, &mut state);
            }

            fn clone_rule(&self) -> Box<dyn $rule> {
                Box::new(self.clone())
            }
        }

        impl<'a> PartialEq for dyn $rule + 'a {
            fn eq(&self, other: &Self) -> bool {
                self.eq_rule(other)
            }
        }

        impl<'a> Eq for dyn $rule + 'a {}

        impl<'a> ::std::hash::Hash for dyn $rule + 'a {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                self.hash_rule(state);
            }
        }

        impl Clone for Box<dyn $rule> {
            fn clone(&self) -> Self {
                (**self).clone_rule()
            }
        }
    };
}

pub(crate) use rule_object;
